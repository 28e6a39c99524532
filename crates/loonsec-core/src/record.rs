//! The opaque CVE record type
//!
//! The NVD API returns one JSON object per vulnerability; LoonSec treats it
//! as an opaque attribute mapping rather than a typed struct, so records pass
//! through unchanged regardless of which attributes the remote service
//! includes. An empty record is a valid "resolved, confirmed absent" state -
//! distinct from "not yet resolved", which is represented by absence from the
//! cache.

use serde_json::Value;

/// A resolved CVE record: one element of the NVD `vulnerabilities` array.
pub type CveRecord = serde_json::Map<String, Value>;

/// Extract the canonical identifier from a record's nested `cve.id` field.
///
/// Returns `None` for records that do not carry one (including the empty
/// confirmed-absent record).
pub fn record_cve_id(record: &CveRecord) -> Option<&str> {
    record
        .get("cve")
        .and_then(|cve| cve.get("id"))
        .and_then(|id| id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_cve_id() {
        let value = json!({
            "cve": {
                "id": "CVE-2021-44228",
                "descriptions": [{ "lang": "en", "value": "Log4Shell" }]
            }
        });
        let record = value.as_object().unwrap();
        assert_eq!(record_cve_id(record), Some("CVE-2021-44228"));
    }

    #[test]
    fn test_record_without_id() {
        let empty = CveRecord::new();
        assert_eq!(record_cve_id(&empty), None);

        let value = json!({ "cve": { "sourceIdentifier": "nvd@nist.gov" } });
        assert_eq!(record_cve_id(value.as_object().unwrap()), None);

        let value = json!({ "cve": { "id": 42 } });
        assert_eq!(record_cve_id(value.as_object().unwrap()), None);
    }
}
