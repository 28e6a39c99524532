//! Shared in-memory CVE record cache
//!
//! The cache maps an identifier to its resolved [`CveRecord`] for the
//! lifetime of the process. Cloning a `CveCache` yields another handle to the
//! same underlying store, so clients constructed from the same handle share
//! entries. There is no eviction: an identifier, once present, stays present.
//!
//! An empty record is a meaningful entry ("resolved, confirmed absent") and
//! is served from the cache like any other hit.

use loonsec_core::CveRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Handle to a shared identifier -> record store.
///
/// Entries are written at most once per identifier under normal operation;
/// concurrent writers racing on the same key are safe and last-write-wins,
/// since both are expected to hold the same value.
#[derive(Debug, Clone, Default)]
pub struct CveCache {
    inner: Arc<Mutex<HashMap<String, CveRecord>>>,
}

impl CveCache {
    /// Create a new, empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by identifier, cloning it out of the store
    pub fn get(&self, cve_id: &str) -> Option<CveRecord> {
        self.inner.lock().unwrap().get(cve_id).cloned()
    }

    /// Store a record under an identifier
    pub fn insert(&self, cve_id: impl Into<String>, record: CveRecord) {
        self.inner.lock().unwrap().insert(cve_id.into(), record);
    }

    /// Check whether an identifier has been resolved (including to absence)
    pub fn contains(&self, cve_id: &str) -> bool {
        self.inner.lock().unwrap().contains_key(cve_id)
    }

    /// Number of cached identifiers
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record(id: &str) -> CveRecord {
        json!({ "cve": { "id": id } }).as_object().unwrap().clone()
    }

    #[test]
    fn test_insert_and_get() {
        let cache = CveCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.get("CVE-2024-31497"), None);

        cache.insert("CVE-2024-31497", sample_record("CVE-2024-31497"));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("CVE-2024-31497"));
        assert_eq!(
            cache.get("CVE-2024-31497"),
            Some(sample_record("CVE-2024-31497"))
        );
    }

    #[test]
    fn test_empty_record_is_a_hit() {
        let cache = CveCache::new();
        cache.insert("CVE-2024-0001", CveRecord::new());

        assert!(cache.contains("CVE-2024-0001"));
        assert_eq!(cache.get("CVE-2024-0001"), Some(CveRecord::new()));
    }

    #[test]
    fn test_clone_shares_store() {
        let cache = CveCache::new();
        let handle = cache.clone();

        handle.insert("CVE-2021-44228", sample_record("CVE-2021-44228"));
        assert!(cache.contains("CVE-2021-44228"));
    }

    #[test]
    fn test_concurrent_writes_same_key() {
        let cache = CveCache::new();
        let mut handles = Vec::new();

        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                cache.insert("CVE-2024-31497", sample_record("CVE-2024-31497"));
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("CVE-2024-31497"),
            Some(sample_record("CVE-2024-31497"))
        );
    }
}
