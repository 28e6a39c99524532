//! NVD API 2.0 client
//!
//! [`NvdClient`] owns communication with the NVD CVE services: cache-first
//! single-CVE lookup with a fixed retry budget, and filtered bulk listing
//! with pagination and identifier-level deduplication.
//!
//! The compatibility surfaces ([`NvdClient::get_detail`],
//! [`NvdClient::list_details`]) never fail: every failure path degrades to an
//! empty record or an empty page, logged via `tracing`. The `try_` variants
//! surface the structured error instead.

use crate::cache::CveCache;
use crate::transport::{HttpTransport, NvdTransport};
use loonsec_common::config::NvdConfig;
use loonsec_core::{record_cve_id, CveRecord, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// NVD CVE API 2.0 endpoint
pub const DEFAULT_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// Records requested per bulk page
const PAGE_SIZE: u32 = 2000;

/// Attempts per bulk page fetch, independent of the per-CVE retry budget
const PAGE_RETRY_COUNT: u32 = 2;

/// Date-range filter parameters the bulk listing accepts; anything else is
/// silently dropped. Values are passed through unvalidated.
const RECOGNIZED_FILTERS: [&str; 4] = [
    "lastModStartDate",
    "lastModEndDate",
    "pubStartDate",
    "pubEndDate",
];

/// One page of the NVD CVE listing, also used as the bulk result shape
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NvdPage {
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub start_index: u32,
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub vulnerabilities: Vec<CveRecord>,
}

/// Client for the NVD CVE API
///
/// Cloning yields a client sharing the same transport and cache.
#[derive(Clone)]
pub struct NvdClient {
    transport: Arc<dyn NvdTransport>,
    cache: CveCache,
    retry_count: u32,
    caching: bool,
    cache_max_age_seconds: u64,
}

impl NvdClient {
    /// Create a client against the default API URL.
    ///
    /// `api_key`, if present, is attached to every request as the `apiKey`
    /// header. `retry_count` is the attempt budget per single-CVE lookup
    /// (minimum 1). `cache_max_age_seconds` is accepted for forward
    /// compatibility; cached records currently never expire.
    pub fn new(
        api_key: Option<&str>,
        retry_count: u32,
        caching: bool,
        cache_max_age_seconds: u64,
    ) -> Result<Self> {
        let mut builder = Self::builder()
            .retry_count(retry_count)
            .caching(caching)
            .cache_max_age_seconds(cache_max_age_seconds);
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Create a client from the configuration layer
    pub fn from_config(config: &NvdConfig) -> Result<Self> {
        let mut builder = Self::builder()
            .api_url(&config.api_url)
            .retry_count(config.retry_count)
            .caching(config.caching)
            .cache_max_age_seconds(config.cache_max_age_seconds);
        if let Some(ref key) = config.api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Create a client builder
    pub fn builder() -> NvdClientBuilder {
        NvdClientBuilder::new()
    }

    /// The cache handle this client resolves against
    pub fn cache(&self) -> &CveCache {
        &self.cache
    }

    /// Attempt budget per single-CVE lookup
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Whether lookups consult the cache
    pub fn caching_enabled(&self) -> bool {
        self.caching
    }

    /// Advertised cache max age. Not currently enforced; see [`CveCache`].
    pub fn cache_max_age_seconds(&self) -> u64 {
        self.cache_max_age_seconds
    }

    /// Retrieve the details of a CVE by identifier.
    ///
    /// Never fails: lookup errors are logged and degrade to an empty record,
    /// so callers cannot distinguish "not found" from "gave up". Use
    /// [`NvdClient::try_get_detail`] to observe the failure instead.
    pub async fn get_detail(&self, cve_id: &str) -> CveRecord {
        match self.try_get_detail(cve_id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    cve_id,
                    code = e.code(),
                    error = %e,
                    "CVE lookup failed, returning empty record"
                );
                CveRecord::new()
            }
        }
    }

    /// Retrieve the details of a CVE, surfacing lookup failures.
    ///
    /// Cache hits return immediately without touching the network. A lookup
    /// reporting zero results is memoized as an empty record - confirmed
    /// absence, written even when caching is disabled - while transient
    /// failures are never cached, so a later call retries the network.
    pub async fn try_get_detail(&self, cve_id: &str) -> Result<CveRecord> {
        if self.caching {
            if let Some(record) = self.cache.get(cve_id) {
                debug!(cve_id, "cache hit");
                return Ok(record);
            }
        }

        let query = [(String::from("cveId"), String::from(cve_id))];

        for attempt in 1..=self.retry_count {
            match self.lookup_once(&query, cve_id).await {
                Ok(Some(record)) => {
                    if self.caching {
                        self.cache.insert(cve_id, record.clone());
                    }
                    return Ok(record);
                }
                Ok(None) => {
                    let record = CveRecord::new();
                    self.cache.insert(cve_id, record.clone());
                    return Ok(record);
                }
                Err(e) if e.is_retryable() => {
                    debug!(
                        cve_id,
                        attempt,
                        code = e.code(),
                        error = %e,
                        "lookup attempt failed"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::Exhausted {
            attempts: self.retry_count,
        })
    }

    /// One lookup attempt: `Some(record)` for a single result, `None` for a
    /// confirmed zero-result response.
    async fn lookup_once(
        &self,
        query: &[(String, String)],
        cve_id: &str,
    ) -> Result<Option<CveRecord>> {
        let response = self.transport.get(query).await?;
        if response.status != 200 {
            return Err(Error::UnexpectedStatus {
                status: response.status,
            });
        }

        let page: NvdPage = serde_json::from_value(response.body)?;
        match page.results_per_page {
            0 => Ok(None),
            1 => page.vulnerabilities.into_iter().next().map(Some).ok_or_else(|| {
                Error::Parse(format!(
                    "lookup for {} reported one result but carried none",
                    cve_id
                ))
            }),
            n => Err(Error::AmbiguousResult {
                cve_id: String::from(cve_id),
                count: n as usize,
            }),
        }
    }

    /// Retrieve a filtered CVE listing.
    ///
    /// Never fails: errors are logged and degrade to a page with zero
    /// entries. Use [`NvdClient::try_list_details`] to observe the failure.
    pub async fn list_details(&self, filters: &HashMap<String, String>) -> NvdPage {
        match self.try_list_details(filters).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    code = e.code(),
                    error = %e,
                    "bulk CVE listing failed, returning empty result"
                );
                NvdPage::default()
            }
        }
    }

    /// Retrieve a filtered CVE listing, surfacing failures.
    ///
    /// Unrecognized filter keys are dropped. When the first page already
    /// covers the reported total it is returned as-is; otherwise subsequent
    /// pages are fetched, advancing the start offset by the number of records
    /// accumulated so far, and the combined list is deduplicated by
    /// identifier with first-seen order preserved.
    pub async fn try_list_details(&self, filters: &HashMap<String, String>) -> Result<NvdPage> {
        let params = normalize_filters(filters);

        let mut page = self.fetch_page(&params, 0).await?;
        if page.results_per_page == page.total_results {
            return Ok(page);
        }

        while (page.vulnerabilities.len() as u32) < page.total_results {
            let start_index = page.vulnerabilities.len() as u32;
            let next = self.fetch_page(&params, start_index).await?;
            if next.vulnerabilities.is_empty() {
                warn!(
                    accumulated = page.vulnerabilities.len(),
                    total_results = page.total_results,
                    "empty page before reported total was reached, stopping pagination"
                );
                break;
            }
            page.vulnerabilities.extend(next.vulnerabilities);
        }

        page.vulnerabilities = dedup_by_cve_id(page.vulnerabilities);
        Ok(page)
    }

    /// Fetch one bulk page with the page-level retry budget
    async fn fetch_page(&self, filters: &[(String, String)], start_index: u32) -> Result<NvdPage> {
        let mut query = vec![
            (String::from("resultsPerPage"), PAGE_SIZE.to_string()),
            (String::from("startIndex"), start_index.to_string()),
        ];
        query.extend_from_slice(filters);

        for attempt in 1..=PAGE_RETRY_COUNT {
            match self.fetch_page_once(&query).await {
                Ok(page) => {
                    if page.results_per_page != page.total_results {
                        debug!(
                            results_per_page = page.results_per_page,
                            total_results = page.total_results,
                            "page does not cover the reported total"
                        );
                    }
                    return Ok(page);
                }
                Err(e) if e.is_retryable() => {
                    debug!(
                        start_index,
                        attempt,
                        code = e.code(),
                        error = %e,
                        "page fetch attempt failed"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::Exhausted {
            attempts: PAGE_RETRY_COUNT,
        })
    }

    async fn fetch_page_once(&self, query: &[(String, String)]) -> Result<NvdPage> {
        let response = self.transport.get(query).await?;
        if response.status != 200 {
            return Err(Error::UnexpectedStatus {
                status: response.status,
            });
        }
        Ok(serde_json::from_value(response.body)?)
    }
}

/// Builder for constructing an NvdClient
pub struct NvdClientBuilder {
    api_url: String,
    api_key: Option<String>,
    retry_count: u32,
    caching: bool,
    cache_max_age_seconds: u64,
    cache: Option<CveCache>,
    transport: Option<Arc<dyn NvdTransport>>,
}

impl NvdClientBuilder {
    pub fn new() -> Self {
        Self {
            api_url: String::from(DEFAULT_API_URL),
            api_key: None,
            retry_count: 3,
            caching: true,
            cache_max_age_seconds: 3600,
            cache: None,
            transport: None,
        }
    }

    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn caching(mut self, enabled: bool) -> Self {
        self.caching = enabled;
        self
    }

    pub fn cache_max_age_seconds(mut self, seconds: u64) -> Self {
        self.cache_max_age_seconds = seconds;
        self
    }

    /// Share an existing cache instead of creating a fresh one
    pub fn cache(mut self, cache: CveCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Inject a custom transport (tests, alternative HTTP stacks)
    pub fn transport(mut self, transport: Arc<dyn NvdTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<NvdClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&self.api_url, self.api_key.as_deref())?),
        };

        Ok(NvdClient {
            transport,
            cache: self.cache.unwrap_or_default(),
            retry_count: self.retry_count.max(1),
            caching: self.caching,
            cache_max_age_seconds: self.cache_max_age_seconds,
        })
    }
}

impl Default for NvdClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep only recognized filter keys, in a stable order
fn normalize_filters(filters: &HashMap<String, String>) -> Vec<(String, String)> {
    RECOGNIZED_FILTERS
        .iter()
        .filter_map(|key| filters.get(*key).map(|v| (String::from(*key), v.clone())))
        .collect()
}

/// Deduplicate records by `cve.id`, preserving first-seen order.
/// Records without an identifier cannot be deduplicated and are kept.
fn dedup_by_cve_id(records: Vec<CveRecord>) -> Vec<CveRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(records.len());

    for record in records {
        let id = record_cve_id(&record).map(String::from);
        if let Some(id) = id {
            if !seen.insert(id) {
                continue;
            }
        }
        result.push(record);
    }

    result
}
