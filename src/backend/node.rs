//! [`DynamicOps`] over the crate's own ordered tree.

use indexmap::IndexMap;

use crate::{
    ops::{
        DynamicOps,
        Number,
    },
    result::DataResult,
};

/// A plain ordered tree value.
///
/// Maps are [`IndexMap`]s, so entry order is insertion order. Unlike JSON,
/// non-finite doubles are stored verbatim.
#[derive(Clone, PartialEq, Debug, Default)]
pub enum Node {
    /// The empty sentinel.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// A list.
    List(Vec<Node>),
    /// An ordered map with string keys.
    Map(IndexMap<String, Node>),
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Self::Number(Number::Int(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Ops over [`Node`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NodeOps;

impl DynamicOps for NodeOps {
    type Value = Node;

    fn name(&self) -> &'static str {
        "node"
    }

    fn empty(&self) -> Node {
        Node::Null
    }

    fn is_null(&self, value: &Node) -> bool {
        matches!(value, Node::Null)
    }

    fn is_map(&self, value: &Node) -> bool {
        matches!(value, Node::Map(_))
    }

    fn is_list(&self, value: &Node) -> bool {
        matches!(value, Node::List(_))
    }

    fn is_string(&self, value: &Node) -> bool {
        matches!(value, Node::String(_))
    }

    fn is_number(&self, value: &Node) -> bool {
        matches!(value, Node::Number(_))
    }

    fn is_bool(&self, value: &Node) -> bool {
        matches!(value, Node::Bool(_))
    }

    fn create_bool(&self, value: bool) -> Node {
        Node::Bool(value)
    }

    fn create_number(&self, value: Number) -> Node {
        Node::Number(value)
    }

    fn create_string(&self, value: &str) -> Node {
        Node::String(value.to_owned())
    }

    fn get_bool(&self, value: &Node) -> DataResult<bool> {
        match value {
            Node::Bool(value) => DataResult::success(*value),
            other => DataResult::error(format!("Not a boolean: {other:?}")),
        }
    }

    fn get_number(&self, value: &Node) -> DataResult<Number> {
        match value {
            Node::Number(value) => DataResult::success(*value),
            other => DataResult::error(format!("Not a number: {other:?}")),
        }
    }

    fn get_string(&self, value: &Node) -> DataResult<String> {
        match value {
            Node::String(value) => DataResult::success(value.clone()),
            other => DataResult::error(format!("Not a string: {other:?}")),
        }
    }

    fn create_list(&self, items: impl Iterator<Item = Node>) -> Node {
        Node::List(items.collect())
    }

    fn get_list(&self, value: &Node) -> DataResult<Vec<Node>> {
        match value {
            Node::List(items) => DataResult::success(items.clone()),
            other => DataResult::error(format!("Not a list: {other:?}")),
        }
    }

    fn merge_to_list(&self, list: &Node, element: Node) -> DataResult<Node> {
        match list {
            Node::Null => DataResult::success(Node::List(vec![element])),
            Node::List(items) => {
                let mut items = items.clone();
                items.push(element);
                DataResult::success(Node::List(items))
            }
            other => DataResult::error(format!("Not a list: {other:?}")),
        }
    }

    fn create_map(&self, entries: impl Iterator<Item = (Node, Node)>) -> Node {
        let mut map = IndexMap::new();
        for (key, value) in entries {
            if let Node::String(key) = key {
                map.insert(key, value);
            }
        }
        Node::Map(map)
    }

    fn get_map_entries(&self, value: &Node) -> DataResult<Vec<(Node, Node)>> {
        match value {
            Node::Map(map) => DataResult::success(
                map.iter()
                    .map(|(key, value)| (Node::String(key.clone()), value.clone()))
                    .collect(),
            ),
            other => DataResult::error(format!("Not a map: {other:?}")),
        }
    }

    fn merge_to_map(&self, map: &Node, key: Node, value: Node) -> DataResult<Node> {
        let mut merged = match map {
            Node::Null => IndexMap::new(),
            Node::Map(map) => map.clone(),
            other => return DataResult::error(format!("Not a map: {other:?}")),
        };
        match key {
            Node::String(key) => {
                merged.insert(key, value);
                DataResult::success(Node::Map(merged))
            }
            other => DataResult::error_with_partial(
                format!("Not a string: {other:?}"),
                Node::Map(merged),
            ),
        }
    }

    fn merge_maps(&self, first: &Node, second: &Node) -> DataResult<Node> {
        let mut merged = match first {
            Node::Null => IndexMap::new(),
            Node::Map(map) => map.clone(),
            other => return DataResult::error(format!("Not a map: {other:?}")),
        };
        match second {
            Node::Map(map) => {
                for (key, value) in map {
                    merged.insert(key.clone(), value.clone());
                }
                DataResult::success(Node::Map(merged))
            }
            other => DataResult::error_with_partial(
                format!("Not a map: {other:?}"),
                Node::Map(merged),
            ),
        }
    }

    fn get_field(&self, value: &Node, name: &str) -> Option<Node> {
        match value {
            Node::Map(map) => map.get(name).cloned(),
            _ => None,
        }
    }

    fn set_field(&self, value: &Node, name: &str, field: Node) -> Node {
        match value {
            Node::Map(map) => {
                let mut map = map.clone();
                map.insert(name.to_owned(), field);
                Node::Map(map)
            }
            other => other.clone(),
        }
    }

    fn remove_field(&self, value: &Node, name: &str) -> Node {
        match value {
            Node::Map(map) => {
                let mut map = map.clone();
                map.shift_remove(name);
                Node::Map(map)
            }
            other => other.clone(),
        }
    }

    fn has_field(&self, value: &Node, name: &str) -> bool {
        matches!(value, Node::Map(map) if map.contains_key(name))
    }
}
