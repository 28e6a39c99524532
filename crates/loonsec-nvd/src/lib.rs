//! LoonSec NVD - NVD API 2.0 client
//!
//! This crate provides:
//! - `NvdClient`: single-CVE lookup and filtered bulk listing with retry,
//!   pagination, and deduplication
//! - `CveCache`: a shared in-memory record cache with process lifetime
//! - `NvdTransport`: the HTTP seam, with a reqwest-backed `HttpTransport`
//!   for production and injectable mocks for tests
//!
//! # Example
//!
//! ```no_run
//! use loonsec_nvd::NvdClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = NvdClient::new(None, 3, true, 3600).unwrap();
//!     let record = client.get_detail("CVE-2024-31497").await;
//!     println!("{}", serde_json::Value::Object(record));
//! }
//! ```

pub mod cache;
pub mod client;
pub mod transport;

pub use cache::CveCache;
pub use client::{NvdClient, NvdClientBuilder, NvdPage, DEFAULT_API_URL};
pub use transport::{ApiResponse, HttpTransport, NvdTransport};
