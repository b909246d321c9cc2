use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "public_url": { "type": "string", "format": "uri" },
                    "cors_origins": { "type": "array", "items": { "type": "string" } }
                }
            },
            "storage": {
                "type": "object",
                "properties": {
                    "static_dir": { "type": "string" },
                    "reports_dir": { "type": "string" }
                }
            },
            "model": {
                "type": "object",
                "properties": {
                    "classifier_url": { "type": "string", "format": "uri" },
                    "explainer_url": { "type": "string", "format": "uri" },
                    "timeout_secs": { "type": "integer", "minimum": 1 },
                    "max_retries": { "type": "integer", "minimum": 0 }
                }
            }
        }
    })
});
