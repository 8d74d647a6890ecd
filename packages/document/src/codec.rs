//! Document codec: raw stored value ⇄ `Wrapper`.
//!
//! Builders have stored the same logical document three different ways
//! over the years, and as either a nested mapping or a single encoded
//! string. Decode remembers which shape and which storage type the input
//! used; encode writes the mutated tree back into exactly that position,
//! leaving every sibling key untouched.

use crate::legacy;
use crate::node::Node;
use serde_json::{Map, Value};
use tracing::debug;

/// Which of the historical storage shapes held the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootSource {
    /// `{ "treeJsonString": "<json of { root, ... }>" }`
    TreeJsonString,
    /// `{ "root": { ... } }`
    Root,
    /// `{ "element": { ... } }` — a bare element, wrapped on decode.
    Element,
}

/// Whether the raw value arrived as a mapping or as an encoded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginalType {
    Mapping,
    String,
}

pub const TREE_JSON_KEY: &str = "treeJsonString";
pub const ROOT_KEY: &str = "root";
pub const ELEMENT_KEY: &str = "element";

/// Id and type of the root synthesized around a bare `element` document.
/// Keeping these canonical makes the `element` shape round-trip stable.
const WRAPPER_ROOT_ID: u64 = 0;
const WRAPPER_ROOT_TYPE: &str = "root";

/// A decoded document plus everything needed to re-encode it in the same
/// storage shape. Constructed fresh per call, discarded after encode.
#[derive(Debug, Clone)]
pub struct Wrapper {
    pub raw_original: Value,
    pub decoded: Map<String, Value>,
    pub inner: Option<Map<String, Value>>,
    pub root: Node,
    pub root_source: RootSource,
    pub original_type: OriginalType,
}

/// Decode a raw stored value. Absence (`None`) means "no usable document";
/// callers bootstrap with [`build_empty`] when they intend to write.
pub fn decode(raw: &Value) -> Option<Wrapper> {
    let (decoded, original_type) = match raw {
        Value::Object(map) => (map.clone(), OriginalType::Mapping),
        Value::String(text) => (decode_string(text)?, OriginalType::String),
        _ => return None,
    };

    let (root, root_source, inner) = detect_shape(&decoded)?;
    debug!(?root_source, ?original_type, "decoded builder document");

    Some(Wrapper {
        raw_original: raw.clone(),
        decoded,
        inner,
        root,
        root_source,
        original_type,
    })
}

/// Canonical empty document, used when a mutation is requested but no
/// document exists yet.
pub fn build_empty() -> Wrapper {
    let root = Node::new(WRAPPER_ROOT_ID, WRAPPER_ROOT_TYPE);
    let mut inner = Map::new();
    inner.insert(ROOT_KEY.to_string(), root.to_value());

    let mut decoded = Map::new();
    decoded.insert(
        TREE_JSON_KEY.to_string(),
        Value::String(serialize_map(&inner)),
    );

    Wrapper {
        raw_original: Value::Object(decoded.clone()),
        decoded,
        inner: Some(inner),
        root,
        root_source: RootSource::TreeJsonString,
        original_type: OriginalType::Mapping,
    }
}

/// Re-encode a wrapper around a new root. Total: a wrapper with a missing
/// inner mapping falls back to the shape [`build_empty`] produces rather
/// than failing.
pub fn encode(wrapper: &Wrapper, new_root: &Node) -> Value {
    let mut decoded = wrapper.decoded.clone();

    match wrapper.root_source {
        RootSource::TreeJsonString => {
            let mut inner = wrapper.inner.clone().unwrap_or_default();
            inner.insert(ROOT_KEY.to_string(), new_root.to_value());
            decoded.insert(
                TREE_JSON_KEY.to_string(),
                Value::String(serialize_map(&inner)),
            );
        }
        RootSource::Root => {
            decoded.insert(ROOT_KEY.to_string(), new_root.to_value());
        }
        RootSource::Element => {
            // The wrapper root was synthesized on decode; what the host
            // stores is the single element underneath it.
            let element = new_root
                .children
                .first()
                .map(Node::to_value)
                .unwrap_or_else(|| new_root.to_value());
            decoded.insert(ELEMENT_KEY.to_string(), element);
        }
    }

    match wrapper.original_type {
        OriginalType::Mapping => Value::Object(decoded),
        OriginalType::String => Value::String(serialize_map(&decoded)),
    }
}

fn serialize_map(map: &Map<String, Value>) -> String {
    serde_json::to_string(&Value::Object(map.clone())).unwrap_or_default()
}

fn decode_string(text: &str) -> Option<Map<String, Value>> {
    if let Some(Value::Object(map)) = legacy::decode(text) {
        return Some(map);
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }
    // Some hosts double-encode: a JSON string of a JSON document. Strip the
    // surrounding quotes and reverse the string escaping, then retry.
    let cleaned = unescape(strip_quotes(text));
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\'') => out.push('\''),
                Some('\\') => out.push('\\'),
                Some('/') => out.push('/'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn detect_shape(decoded: &Map<String, Value>) -> Option<(Node, RootSource, Option<Map<String, Value>>)> {
    if let Some(tree_json) = decoded.get(TREE_JSON_KEY) {
        let inner = match tree_json {
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => map,
                _ => return None,
            },
            // Older revisions stored the inner mapping un-stringified.
            Value::Object(map) => map.clone(),
            _ => return None,
        };
        let root = match inner.get(ROOT_KEY) {
            Some(value @ Value::Object(_)) => Node::from_value(value)?,
            _ => return None,
        };
        return Some((root, RootSource::TreeJsonString, Some(inner)));
    }

    if let Some(value @ Value::Object(_)) = decoded.get(ROOT_KEY) {
        let root = Node::from_value(value)?;
        return Some((root, RootSource::Root, None));
    }

    if let Some(value @ Value::Object(_)) = decoded.get(ELEMENT_KEY) {
        let element = Node::from_value(value)?;
        let root = Node::with_children(WRAPPER_ROOT_ID, WRAPPER_ROOT_TYPE, vec![element]);
        return Some((root, RootSource::Element, None));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_tree_json_string_shape() {
        let raw = json!({ "treeJsonString": "{\"root\":{\"id\":1,\"children\":[]}}" });
        let wrapper = decode(&raw).unwrap();
        assert_eq!(wrapper.root_source, RootSource::TreeJsonString);
        assert_eq!(wrapper.original_type, OriginalType::Mapping);
        assert_eq!(wrapper.root.id, 1);
        assert!(wrapper.root.children.is_empty());
    }

    #[test]
    fn test_decode_root_shape() {
        let raw = json!({ "root": { "id": 1, "children": [] } });
        let wrapper = decode(&raw).unwrap();
        assert_eq!(wrapper.root_source, RootSource::Root);
        assert_eq!(wrapper.root.id, 1);
    }

    #[test]
    fn test_decode_element_shape_synthesizes_root() {
        let raw = json!({ "element": { "id": 9, "type": "section" } });
        let wrapper = decode(&raw).unwrap();
        assert_eq!(wrapper.root_source, RootSource::Element);
        assert_eq!(wrapper.root.element_type, "root");
        assert_eq!(wrapper.root.children.len(), 1);
        assert_eq!(wrapper.root.children[0].id, 9);
    }

    #[test]
    fn test_decode_string_input() {
        let raw = Value::String("{\"root\":{\"id\":3,\"children\":[]}}".to_string());
        let wrapper = decode(&raw).unwrap();
        assert_eq!(wrapper.original_type, OriginalType::String);
        assert_eq!(wrapper.root.id, 3);
    }

    #[test]
    fn test_decode_legacy_serialized_string() {
        let raw = Value::String(
            "a:1:{s:4:\"root\";a:2:{s:2:\"id\";i:5;s:8:\"children\";a:0:{}}}".to_string(),
        );
        let wrapper = decode(&raw).unwrap();
        assert_eq!(wrapper.original_type, OriginalType::String);
        assert_eq!(wrapper.root_source, RootSource::Root);
        assert_eq!(wrapper.root.id, 5);
    }

    #[test]
    fn test_decode_double_encoded_string() {
        let raw = Value::String("\"{\\\"root\\\":{\\\"id\\\":2,\\\"children\\\":[]}}\"".to_string());
        let wrapper = decode(&raw).unwrap();
        assert_eq!(wrapper.root.id, 2);
    }

    #[test]
    fn test_decode_failure_is_absence() {
        assert!(decode(&json!({ "unrelated": 1 })).is_none());
        assert!(decode(&json!(42)).is_none());
        assert!(decode(&Value::String("not a document".into())).is_none());
        assert!(decode(&json!({ "treeJsonString": "not json" })).is_none());
    }

    #[test]
    fn test_round_trip_preserves_shape_and_siblings() {
        let raw = json!({
            "treeJsonString": "{\"root\":{\"id\":1,\"children\":[{\"id\":2,\"type\":\"section\",\"children\":[]}]},\"settings\":{\"palette\":\"dark\"}}",
            "version": 7
        });
        let wrapper = decode(&raw).unwrap();
        let encoded = encode(&wrapper, &wrapper.root);

        let again = decode(&encoded).unwrap();
        assert_eq!(again.root, wrapper.root);
        assert_eq!(again.root_source, wrapper.root_source);
        assert_eq!(again.original_type, wrapper.original_type);

        // Sibling keys survive both levels.
        assert_eq!(encoded["version"], json!(7));
        assert_eq!(again.inner.as_ref().unwrap()["settings"], json!({ "palette": "dark" }));
    }

    #[test]
    fn test_round_trip_string_type() {
        let raw = Value::String("{\"root\":{\"id\":3,\"children\":[]}}".to_string());
        let wrapper = decode(&raw).unwrap();
        let encoded = encode(&wrapper, &wrapper.root);
        assert!(matches!(encoded, Value::String(_)));

        let again = decode(&encoded).unwrap();
        assert_eq!(again.root, wrapper.root);
        assert_eq!(again.original_type, OriginalType::String);
    }

    #[test]
    fn test_round_trip_element_shape() {
        let raw = json!({ "element": { "id": 9, "type": "section", "children": [] } });
        let wrapper = decode(&raw).unwrap();
        let encoded = encode(&wrapper, &wrapper.root);

        let again = decode(&encoded).unwrap();
        assert_eq!(again.root, wrapper.root);
        assert_eq!(again.root_source, RootSource::Element);
    }

    #[test]
    fn test_encode_with_mutated_root() {
        let raw = json!({ "root": { "id": 1, "children": [] } });
        let wrapper = decode(&raw).unwrap();

        let new_root = Node::with_children(1, "root", vec![Node::new(2, "section")]);
        let encoded = encode(&wrapper, &new_root);
        let again = decode(&encoded).unwrap();
        assert_eq!(again.root, new_root);
    }

    #[test]
    fn test_build_empty() {
        let wrapper = build_empty();
        assert_eq!(wrapper.root_source, RootSource::TreeJsonString);
        assert_eq!(wrapper.original_type, OriginalType::Mapping);
        assert!(wrapper.root.children.is_empty());

        // The canonical empty document decodes back to itself.
        let again = decode(&wrapper.raw_original).unwrap();
        assert_eq!(again.root, wrapper.root);
        assert_eq!(again.root_source, RootSource::TreeJsonString);
    }
}
