//! LoonSec Enrich - CVE discovery and enrichment for nested JSON data
//!
//! This crate provides [`CveScanner`], which walks arbitrarily shaped JSON
//! structures, detects CVE identifiers in object string values, and either
//! reports every match or embeds the resolved records in place under the
//! reserved `loon_sec` key. Resolution goes through
//! [`loonsec_nvd::NvdClient`], so repeated identifiers cost one network call.
//!
//! # Example
//!
//! ```no_run
//! use loonsec_enrich::CveScanner;
//! use loonsec_nvd::NvdClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = NvdClient::new(None, 3, true, 3600).unwrap();
//!     let scanner = CveScanner::new(client);
//!
//!     let mut finding = json!({ "ref": "CVE-2024-31497" });
//!     scanner.embed_details(&mut finding).await;
//! }
//! ```

pub mod scanner;

pub use scanner::{CveMatch, CveScanner, DETAILS_KEY, EMBED_KEY};
