//! HTTP transport seam for the NVD API
//!
//! The client never talks to reqwest directly; it goes through the
//! [`NvdTransport`] trait, which models the remote contract as "GET with
//! query parameters, returning a status code and a parsed JSON body". Tests
//! inject a mock implementation; production uses [`HttpTransport`].

use async_trait::async_trait;
use loonsec_core::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// A transport-level response: HTTP status plus the parsed JSON body.
///
/// The body is only parsed for successful responses; error statuses carry
/// `Value::Null` since the caller retries without inspecting them.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// The HTTP seam the NVD client is written against
#[async_trait]
pub trait NvdTransport: Send + Sync {
    /// Issue a GET against the API endpoint with the given query parameters
    async fn get(&self, query: &[(String, String)]) -> Result<ApiResponse>;
}

/// reqwest-backed transport for the NVD API
pub struct HttpTransport {
    client: Client,
    api_url: String,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Create a transport against `api_url`.
    ///
    /// Every request carries `Content-Type: application/json`; when an API
    /// key is supplied it is attached as the `apiKey` header. The key is
    /// never logged.
    pub fn new(api_url: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| Error::Configuration(String::from("API key is not a valid header value")))?;
            headers.insert("apiKey", value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            headers,
        })
    }
}

#[async_trait]
impl NvdTransport for HttpTransport {
    async fn get(&self, query: &[(String, String)]) -> Result<ApiResponse> {
        let response = self
            .client
            .get(&self.api_url)
            .headers(self.headers.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| Error::Parse(format!("Failed to parse NVD response: {}", e)))?
        } else {
            Value::Null
        };

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_header_attached() {
        let transport =
            HttpTransport::new("https://services.nvd.nist.gov/rest/json/cves/2.0", Some("k-123"))
                .unwrap();
        assert_eq!(
            transport.headers.get("apiKey").map(|v| v.to_str().unwrap()),
            Some("k-123")
        );
        assert_eq!(
            transport.headers.get(CONTENT_TYPE).map(|v| v.to_str().unwrap()),
            Some("application/json")
        );
    }

    #[test]
    fn test_no_api_key_header_without_key() {
        let transport =
            HttpTransport::new("https://services.nvd.nist.gov/rest/json/cves/2.0", None).unwrap();
        assert!(transport.headers.get("apiKey").is_none());
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let result =
            HttpTransport::new("https://services.nvd.nist.gov/rest/json/cves/2.0", Some("bad\nkey"));
        assert!(result.is_err());
    }
}
