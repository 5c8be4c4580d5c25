//! OpenSearch index creation body.

use serde_json::{json, Map, Value};

use crate::config::IndexSettings;

/// Build the create-index body from the settings and optional mappings.
///
/// Without mappings the engine maps fields dynamically on first insert.
pub fn build_index_body(settings: &IndexSettings, mappings: Option<Value>) -> Value {
    let mut body = Map::new();
    body.insert(
        "settings".to_string(),
        json!({
            "number_of_shards": settings.number_of_shards,
            "number_of_replicas": settings.number_of_replicas
        }),
    );
    if let Some(mappings) = mappings {
        body.insert("mappings".to_string(), mappings);
    }
    Value::Object(body)
}
