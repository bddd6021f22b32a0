//! # Embed Schema Validation
//!
//! Whole-object conformance checks for embed payloads. The engine only depends
//! on [`SchemaValidator`]; [`JsonSchema`] is the bundled implementation, a
//! compiled subset of JSON Schema that words its violations the way editors
//! and `ajv` users expect (`must be string`, `must NOT have additional
//! properties`, ...).
//!
//! ## Supported keywords
//!
//! `type`, `properties`, `required`, `additionalProperties`, `items`,
//! `minItems`, `maxItems`, `minLength`, `maxLength`, `minimum`, `maximum` and
//! `pattern`. Boolean schemas are accepted anywhere a schema is. Other keywords
//! are annotations and ignored.

mod compile;
mod validator;

use std::sync::OnceLock;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use compile::JsonSchema;

const DISCORD_EMBED_SCHEMA: &str = include_str!("embed_schema.json");

/// Anything that can check a JSON value against a fixed schema. Validators are
/// shared by every pass of an [`Analyzer`](crate::Analyzer), including across threads.
pub trait SchemaValidator: Send + Sync {
    /// Every violation found in `instance`, in discovery order.
    fn validate(&self, instance: &Value) -> Vec<Violation>;
}

/// One way a value fails its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// JSON pointer to the offending value; `""` is the root.
    pub path: String,
    /// The schema keyword that failed, e.g. `type` or `additionalProperties`.
    pub keyword: String,
    pub message: String,
    /// Keyword-specific details, e.g. `additionalProperty` or `limit`.
    pub params: Map<String, Value>,
}

impl Violation {
    /// The property that is not allowed, for `additionalProperties` violations.
    pub fn additional_property(&self) -> Option<&str> {
        if self.keyword != "additionalProperties" {
            return None;
        }
        self.params.get("additionalProperty").and_then(Value::as_str)
    }
}

/// Problems with a schema document itself.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema at '{at}' must be an object or a boolean")]
    NotASchema { at: String },

    #[error("'{keyword}' at '{at}' must be {expected}")]
    InvalidKeyword {
        at: String,
        keyword: &'static str,
        expected: &'static str,
    },

    #[error("unknown type '{name}' at '{at}'")]
    UnknownType { at: String, name: String },

    #[error("invalid pattern at '{at}'")]
    Pattern {
        at: String,
        #[source]
        source: regex::Error,
    },
}

impl JsonSchema {
    /// The Discord message embed schema bundled with the engine.
    pub fn discord_embed() -> &'static JsonSchema {
        static SCHEMA: OnceLock<JsonSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            DISCORD_EMBED_SCHEMA
                .parse()
                .expect("Invalid bundled embed schema")
        })
    }
}

impl SchemaValidator for JsonSchema {
    fn validate(&self, instance: &Value) -> Vec<Violation> {
        validator::validate(self, instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn messages(instance: Value) -> Vec<(String, String)> {
        JsonSchema::discord_embed()
            .validate(&instance)
            .into_iter()
            .map(|v| (v.path, v.message))
            .collect()
    }

    fn pair(path: &str, message: &str) -> (String, String) {
        (path.to_string(), message.to_string())
    }

    #[test]
    fn full_embed_is_valid() {
        let embed = json!({
            "title": "Vorkath",
            "description": "Blue dragon, undead.",
            "url": "https://example.test/guides/vorkath",
            "color": 3447003,
            "timestamp": "2024-01-01T00:00:00Z",
            "footer": {"text": "Last updated", "icon_url": "https://example.test/i.png"},
            "image": {"url": "https://example.test/a.png"},
            "thumbnail": {"url": "https://example.test/b.png"},
            "author": {"name": "PvM team"},
            "fields": [
                {"name": "Phase 1", "value": "Dodge the fireball", "inline": true}
            ]
        });
        assert_eq!(messages(embed), vec![]);
    }

    #[test]
    fn unrecognized_properties_are_named() {
        let violations = JsonSchema::discord_embed().validate(&json!({"colour": 1, "title": "x"}));

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "");
        assert_eq!(violations[0].message, "must NOT have additional properties");
        assert_eq!(violations[0].additional_property(), Some("colour"));
    }

    #[test]
    fn additional_property_only_for_that_keyword() {
        let mut params = Map::new();
        params.insert("additionalProperty".to_string(), json!("x"));
        let violation = Violation {
            path: String::new(),
            keyword: "type".to_string(),
            message: String::new(),
            params,
        };
        assert_eq!(violation.additional_property(), None);
    }

    #[test]
    fn all_violations_are_reported() {
        let embed = json!({
            "title": 1,
            "color": -5,
            "footer": {},
            "fields": [{"name": "n"}, {"value": "v", "inline": "yes"}]
        });
        assert_eq!(
            messages(embed),
            vec![
                pair("/color", "must be >= 0"),
                pair("/fields/0", "must have required property 'value'"),
                pair("/fields/1", "must have required property 'name'"),
                pair("/fields/1/inline", "must be boolean"),
                pair("/footer", "must have required property 'text'"),
                pair("/title", "must be string"),
            ]
        );
    }

    #[rstest]
    #[case(json!({"title": "x".repeat(257)}), "/title", "must NOT have more than 256 characters")]
    #[case(json!({"color": 16777216}), "/color", "must be <= 16777215")]
    #[case(json!({"color": 1.5}), "/color", "must be integer")]
    #[case(json!({"image": "https://x.test"}), "/image", "must be object")]
    fn single_violation(#[case] embed: Value, #[case] path: &str, #[case] message: &str) {
        assert_eq!(messages(embed), vec![pair(path, message)]);
    }

    #[test]
    fn too_many_fields() {
        let fields: Vec<Value> = (0..26).map(|i| json!({"name": i.to_string(), "value": "v"})).collect();
        assert_eq!(
            messages(json!({"fields": fields})),
            vec![pair("/fields", "must NOT have more than 25 items")]
        );
    }

    #[test]
    fn character_limits_count_characters_not_bytes() {
        assert_eq!(messages(json!({"title": "é".repeat(256)})), vec![]);
    }
}
