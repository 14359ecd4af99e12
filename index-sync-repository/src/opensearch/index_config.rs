//! OpenSearch index configuration and mappings.
//!
//! OpenSearch has no native notion of ranking rules or synonym objects, so the
//! synchronizer's settings and synonyms are kept in the `_meta` section of the
//! index mapping where query-side code reads them.

use serde_json::{json, Map, Value};

/// Key under `_meta` holding the synchronizer's configuration.
pub const META_KEY: &str = "index_sync";

/// Body used to create a physical index.
///
/// Records are flat and their attributes vary per content category, so the
/// mapping stays dynamic and only pins the fields every query relies on.
pub fn index_body() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": true,
            "properties": {
                "objectID": {
                    "type": "keyword"
                },
                "post_id": {
                    "type": "long"
                },
                "record_index": {
                    "type": "integer"
                },
                "content": {
                    "type": "text"
                },
                "post_date": {
                    "type": "long"
                }
            }
        }
    })
}

/// Merge `value` under `_meta.index_sync.<section>` into the current `_meta`.
///
/// `put_mapping` replaces `_meta` as a whole, so the other sections have to be
/// carried over.
pub fn merge_meta(current: Option<&Value>, section: &str, value: Value) -> Value {
    let mut meta = current
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    let entry = meta
        .entry(META_KEY.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Some(sync_meta) = entry.as_object_mut() {
        sync_meta.insert(section.to_string(), value);
    }

    json!({ "_meta": meta })
}
