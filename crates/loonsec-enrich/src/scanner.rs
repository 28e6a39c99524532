//! Recursive CVE discovery over nested JSON structures
//!
//! The walk is depth-first: object entries in map iteration order, sequence
//! elements in index order. An identifier is detected when an object entry's
//! string value starts with the CVE pattern; the full original string, casing
//! included, is recorded as the identifier.
//!
//! Scalar strings that are direct elements of a sequence are *not* inspected
//! - only object entries are. Objects (and nested sequences) inside
//! sequences are traversed normally. This asymmetry is inherited behavior,
//! kept deliberately and pinned by tests.

use loonsec_core::{is_cve_like, CveRecord};
use loonsec_nvd::NvdClient;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// Reserved key under which resolved details are embedded per container
pub const EMBED_KEY: &str = "loon_sec";

/// Key nested under [`EMBED_KEY`] mapping identifier -> record
pub const DETAILS_KEY: &str = "cve_details";

/// One discovered identifier: the object key it was found under, the full
/// matched string, and the resolved record (empty unless resolution ran).
#[derive(Debug, Clone, PartialEq)]
pub struct CveMatch {
    pub key: String,
    pub cve_id: String,
    pub details: CveRecord,
}

/// Scans nested JSON data for CVE identifiers and enriches it in place
pub struct CveScanner {
    client: NvdClient,
}

impl CveScanner {
    /// Create a scanner resolving through the given client
    pub fn new(client: NvdClient) -> Self {
        Self { client }
    }

    /// The client used for resolution
    pub fn client(&self) -> &NvdClient {
        &self.client
    }

    /// Report every identifier found in `value`, in traversal order.
    ///
    /// With `resolve` set, each match carries its resolved record; resolution
    /// failures degrade to empty records and never abort the walk. Without
    /// `resolve`, every match carries an empty placeholder and no network
    /// traffic occurs.
    pub async fn find_cve_ids(&self, value: &Value, resolve: bool) -> Vec<CveMatch> {
        let mut found: Vec<(String, String)> = Vec::new();
        walk_matches(value, &mut |_container, key, text| {
            found.push((String::from(key), String::from(text)));
        });

        let mut matches = Vec::with_capacity(found.len());
        for (key, cve_id) in found {
            let details = if resolve {
                self.client.get_detail(&cve_id).await
            } else {
                CveRecord::new()
            };
            matches.push(CveMatch {
                key,
                cve_id,
                details,
            });
        }
        matches
    }

    /// Embed resolved details into `value` in place.
    ///
    /// Each container holding a matched identifier gains the reserved
    /// `loon_sec.cve_details` mapping with the record filed under the
    /// identifier. An identifier already embedded in its container is left
    /// untouched and not re-resolved, so repeated scans are idempotent.
    pub async fn embed_details(&self, value: &mut Value) {
        let mut pending: Vec<String> = Vec::new();
        walk_matches(value, &mut |container, _key, text| {
            if !has_embedded(container, text) {
                pending.push(String::from(text));
            }
        });
        if pending.is_empty() {
            return;
        }

        let mut resolved: HashMap<String, CveRecord> = HashMap::new();
        for cve_id in pending {
            if resolved.contains_key(&cve_id) {
                continue;
            }
            let record = self.client.get_detail(&cve_id).await;
            resolved.insert(cve_id, record);
        }

        debug!(count = resolved.len(), "embedding resolved CVE details");
        apply_embeddings(value, &resolved);
    }
}

/// Depth-first walk shared by reporting and embedding. `visit` is called for
/// every object entry whose string value starts with a CVE identifier, with
/// the containing object, the entry key, and the full string.
fn walk_matches<'a>(value: &'a Value, visit: &mut impl FnMut(&'a Map<String, Value>, &'a str, &'a str)) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::Object(_) => walk_matches(child, visit),
                    Value::Array(items) => walk_sequence(items, visit),
                    Value::String(text) if is_cve_like(text) => visit(map, key, text),
                    _ => {}
                }
            }
        }
        Value::Array(items) => walk_sequence(items, visit),
        _ => {}
    }
}

fn walk_sequence<'a>(
    items: &'a [Value],
    visit: &mut impl FnMut(&'a Map<String, Value>, &'a str, &'a str),
) {
    for item in items {
        match item {
            Value::Object(_) => walk_matches(item, visit),
            Value::Array(nested) => walk_sequence(nested, visit),
            // Scalar elements, strings included, are not inspected here
            _ => {}
        }
    }
}

/// Same walk as [`walk_matches`], inserting resolved records into each
/// container after its own entries have been visited.
fn apply_embeddings(value: &mut Value, resolved: &HashMap<String, CveRecord>) {
    match value {
        Value::Object(map) => apply_to_object(map, resolved),
        Value::Array(items) => apply_to_sequence(items, resolved),
        _ => {}
    }
}

fn apply_to_object(map: &mut Map<String, Value>, resolved: &HashMap<String, CveRecord>) {
    let mut found: Vec<String> = Vec::new();
    for (_key, child) in map.iter_mut() {
        match child {
            Value::Object(inner) => apply_to_object(inner, resolved),
            Value::Array(items) => apply_to_sequence(items, resolved),
            Value::String(text) if is_cve_like(text) => found.push(String::from(text.as_str())),
            _ => {}
        }
    }

    for cve_id in found {
        if has_embedded(map, &cve_id) {
            continue;
        }
        if let Some(record) = resolved.get(&cve_id) {
            embed_record(map, &cve_id, record);
        }
    }
}

fn apply_to_sequence(items: &mut [Value], resolved: &HashMap<String, CveRecord>) {
    for item in items {
        match item {
            Value::Object(inner) => apply_to_object(inner, resolved),
            Value::Array(nested) => apply_to_sequence(nested, resolved),
            _ => {}
        }
    }
}

/// Whether `cve_id` is already embedded in this container
fn has_embedded(map: &Map<String, Value>, cve_id: &str) -> bool {
    map.get(EMBED_KEY)
        .and_then(|slot| slot.get(DETAILS_KEY))
        .and_then(|details| details.as_object())
        .is_some_and(|details| details.contains_key(cve_id))
}

fn embed_record(map: &mut Map<String, Value>, cve_id: &str, record: &CveRecord) {
    let slot = map
        .entry(String::from(EMBED_KEY))
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(slot) = slot.as_object_mut() else {
        // The reserved key is occupied by foreign data; leave it alone
        debug!(cve_id, "reserved embedding key holds a non-object, skipping");
        return;
    };

    let details = slot
        .entry(String::from(DETAILS_KEY))
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(details) = details.as_object_mut() else {
        debug!(cve_id, "details slot holds a non-object, skipping");
        return;
    };

    details.insert(String::from(cve_id), Value::Object(record.clone()));
}
