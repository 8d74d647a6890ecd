use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One element of a builder document tree.
///
/// The shape mirrors what builders store on disk: an id, an element type
/// string, an arbitrarily nested property mapping, and ordered children.
/// Child order is significant and preserved by every operation; `id` is
/// cosmetic and never used for addressing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: u64,

    #[serde(rename = "type", default)]
    pub element_type: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(id: u64, element_type: impl Into<String>) -> Self {
        Self {
            id,
            element_type: element_type.into(),
            properties: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(id: u64, element_type: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            id,
            element_type: element_type.into(),
            properties: Map::new(),
            children,
        }
    }

    /// Deserialize a node from its stored mapping shape.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Serialize back into the stored mapping shape.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Node at a positional path, where each index addresses a child.
    /// The empty path is the node itself.
    pub fn get_at(&self, path: &[usize]) -> Option<&Node> {
        let mut current = self;
        for &index in path {
            current = current.children.get(index)?;
        }
        Some(current)
    }

    pub fn get_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut current = self;
        for &index in path {
            current = current.children.get_mut(index)?;
        }
        Some(current)
    }

    /// Read a property through a dot-joined path. Numeric segments index
    /// into sequences.
    pub fn property(&self, property_path: &str) -> Option<&Value> {
        let mut segments = property_path.split('.');
        let first = segments.next()?;
        let mut current = self.properties.get(first)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write a property through a dot-joined path, creating intermediate
    /// mappings as needed. Numeric segments index into existing sequences
    /// only; a missing sequence index aborts the write.
    pub fn set_property_creating(&mut self, property_path: &str, value: Value) -> bool {
        let segments: Vec<&str> = property_path.split('.').collect();
        let Some((&first, rest)) = segments.split_first() else {
            return false;
        };
        if rest.is_empty() {
            self.properties.insert(first.to_string(), value);
            return true;
        }
        let slot = self
            .properties
            .entry(first.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        set_in_value_creating(slot, rest, value)
    }

    /// Write a property through a dot-joined path, overwriting existing
    /// keys only. If any segment is absent the whole write is a no-op.
    pub fn set_property_existing(&mut self, property_path: &str, value: Value) -> bool {
        let segments: Vec<&str> = property_path.split('.').collect();
        let Some((&first, rest)) = segments.split_first() else {
            return false;
        };
        let Some(slot) = self.properties.get_mut(first) else {
            return false;
        };
        if rest.is_empty() {
            *slot = value;
            return true;
        }
        set_in_value_existing(slot, rest, value)
    }

    /// Total number of nodes in this subtree, the node itself included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }
}

fn set_in_value_creating(target: &mut Value, segments: &[&str], value: Value) -> bool {
    let (&segment, rest) = match segments.split_first() {
        Some(split) => split,
        None => return false,
    };
    match target {
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert(segment.to_string(), value);
                return true;
            }
            let slot = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_in_value_creating(slot, rest, value)
        }
        Value::Array(items) => {
            let Some(slot) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) else {
                return false;
            };
            if rest.is_empty() {
                *slot = value;
                return true;
            }
            set_in_value_creating(slot, rest, value)
        }
        _ => false,
    }
}

fn set_in_value_existing(target: &mut Value, segments: &[&str], value: Value) -> bool {
    let (&segment, rest) = match segments.split_first() {
        Some(split) => split,
        None => return false,
    };
    let slot = match target {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
        _ => None,
    };
    let Some(slot) = slot else {
        return false;
    };
    if rest.is_empty() {
        *slot = value;
        return true;
    }
    set_in_value_existing(slot, rest, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Node {
        let value = json!({
            "id": 4,
            "type": "heading",
            "properties": {
                "content": { "content": { "text": "Hello" } },
                "design": { "spacing": { "top": "10" } }
            },
            "children": []
        });
        Node::from_value(&value).unwrap()
    }

    #[test]
    fn test_serde_round_trip() {
        let node = sample();
        let value = node.to_value();
        assert_eq!(value["type"], "heading");
        assert_eq!(Node::from_value(&value).unwrap(), node);
    }

    #[test]
    fn test_missing_fields_default() {
        let node = Node::from_value(&json!({ "type": "section" })).unwrap();
        assert_eq!(node.id, 0);
        assert!(node.children.is_empty());
        assert!(node.properties.is_empty());
    }

    #[test]
    fn test_get_at() {
        let tree = Node::with_children(
            1,
            "root",
            vec![Node::with_children(2, "section", vec![sample()])],
        );
        assert_eq!(tree.get_at(&[]).unwrap().id, 1);
        assert_eq!(tree.get_at(&[0, 0]).unwrap().element_type, "heading");
        assert!(tree.get_at(&[0, 1]).is_none());
    }

    #[test]
    fn test_property_lookup() {
        let node = sample();
        assert_eq!(
            node.property("content.content.text").unwrap(),
            &json!("Hello")
        );
        assert!(node.property("content.content.missing").is_none());
    }

    #[test]
    fn test_property_lookup_through_sequence() {
        let mut node = Node::new(1, "faq");
        node.properties.insert(
            "content".into(),
            json!({ "settings": { "questions": [ { "answer": "a" } ] } }),
        );
        assert_eq!(
            node.property("content.settings.questions.0.answer").unwrap(),
            &json!("a")
        );
        assert!(node.property("content.settings.questions.1.answer").is_none());
    }

    #[test]
    fn test_set_property_creating_builds_structure() {
        let mut node = Node::new(1, "text");
        assert!(node.set_property_creating("content.content.text", json!("made")));
        assert_eq!(node.property("content.content.text").unwrap(), &json!("made"));
    }

    #[test]
    fn test_set_property_existing_never_creates() {
        let mut node = sample();
        assert!(!node.set_property_existing("content.settings.text", json!("x")));
        assert!(node.property("content.settings.text").is_none());

        assert!(node.set_property_existing("content.content.text", json!("updated")));
        assert_eq!(
            node.property("content.content.text").unwrap(),
            &json!("updated")
        );
    }
}
