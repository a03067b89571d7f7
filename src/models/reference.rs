//! Polymorphic entity references for nested write payloads.

use serde::Deserialize;
use serde_json::{Map, Value};

/// A reference to a related entity inside a write payload.
///
/// Three shapes are accepted: a primary-key id, the entity's unique natural
/// key (genre name, author name, book title), or an embedded object that is
/// looked up by its natural key and created when absent. Anything else is
/// captured as [`EntityRef::Other`] and rejected by the resolver with a
/// field-keyed validation error.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EntityRef {
    Id(i64),
    Key(String),
    Embedded(Map<String, Value>),
    Other(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> EntityRef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn integer_parses_as_id() {
        assert!(matches!(parse(json!(42)), EntityRef::Id(42)));
    }

    #[test]
    fn string_parses_as_natural_key() {
        match parse(json!("Jane Doe")) {
            EntityRef::Key(name) => assert_eq!(name, "Jane Doe"),
            other => panic!("expected Key, got {:?}", other),
        }
    }

    #[test]
    fn object_parses_as_embedded() {
        match parse(json!({"name": "Jane Doe", "introduction": "hi"})) {
            EntityRef::Embedded(map) => assert_eq!(map["name"], json!("Jane Doe")),
            other => panic!("expected Embedded, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_shapes_fall_through_to_other() {
        assert!(matches!(parse(json!(true)), EntityRef::Other(_)));
        assert!(matches!(parse(json!([1, 2])), EntityRef::Other(_)));
        assert!(matches!(parse(json!(null)), EntityRef::Other(_)));
        assert!(matches!(parse(json!(4.5)), EntityRef::Other(_)));
    }
}
