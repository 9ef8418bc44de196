//! [`DynamicOps`] over [`serde_json::Value`].

use serde_json::{
    Map,
    Value,
};

use crate::{
    ops::{
        DynamicOps,
        Number,
    },
    result::DataResult,
};

/// Ops over [`serde_json::Value`].
///
/// Map entry order is preserved (the `preserve_order` feature of
/// `serde_json` is required). JSON cannot represent non-finite doubles;
/// they encode as the null sentinel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct JsonOps;

impl DynamicOps for JsonOps {
    type Value = Value;

    fn name(&self) -> &'static str {
        "json"
    }

    fn empty(&self) -> Value {
        Value::Null
    }

    fn is_null(&self, value: &Value) -> bool {
        value.is_null()
    }

    fn is_map(&self, value: &Value) -> bool {
        value.is_object()
    }

    fn is_list(&self, value: &Value) -> bool {
        value.is_array()
    }

    fn is_string(&self, value: &Value) -> bool {
        value.is_string()
    }

    fn is_number(&self, value: &Value) -> bool {
        value.is_number()
    }

    fn is_bool(&self, value: &Value) -> bool {
        value.is_boolean()
    }

    fn create_bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }

    fn create_number(&self, value: Number) -> Value {
        match value {
            Number::Int(value) => Value::Number(value.into()),
            Number::Float(value) => serde_json::Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        }
    }

    fn create_string(&self, value: &str) -> Value {
        Value::String(value.to_owned())
    }

    fn get_bool(&self, value: &Value) -> DataResult<bool> {
        match value {
            Value::Bool(value) => DataResult::success(*value),
            other => DataResult::error(format!("Not a boolean: {other}")),
        }
    }

    fn get_number(&self, value: &Value) -> DataResult<Number> {
        match value {
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    DataResult::success(Number::Int(value))
                } else if let Some(value) = number.as_f64() {
                    DataResult::success(Number::Float(value))
                } else {
                    DataResult::error(format!("Not a number: {number}"))
                }
            }
            other => DataResult::error(format!("Not a number: {other}")),
        }
    }

    fn get_string(&self, value: &Value) -> DataResult<String> {
        match value {
            Value::String(value) => DataResult::success(value.clone()),
            other => DataResult::error(format!("Not a string: {other}")),
        }
    }

    fn create_list(&self, items: impl Iterator<Item = Value>) -> Value {
        Value::Array(items.collect())
    }

    fn get_list(&self, value: &Value) -> DataResult<Vec<Value>> {
        match value {
            Value::Array(items) => DataResult::success(items.clone()),
            other => DataResult::error(format!("Not a list: {other}")),
        }
    }

    fn merge_to_list(&self, list: &Value, element: Value) -> DataResult<Value> {
        match list {
            Value::Null => DataResult::success(Value::Array(vec![element])),
            Value::Array(items) => {
                let mut items = items.clone();
                items.push(element);
                DataResult::success(Value::Array(items))
            }
            other => DataResult::error(format!("Not a list: {other}")),
        }
    }

    fn create_map(&self, entries: impl Iterator<Item = (Value, Value)>) -> Value {
        let mut map = Map::new();
        for (key, value) in entries {
            if let Value::String(key) = key {
                map.insert(key, value);
            }
        }
        Value::Object(map)
    }

    fn get_map_entries(&self, value: &Value) -> DataResult<Vec<(Value, Value)>> {
        match value {
            Value::Object(map) => DataResult::success(
                map.iter()
                    .map(|(key, value)| (Value::String(key.clone()), value.clone()))
                    .collect(),
            ),
            other => DataResult::error(format!("Not a map: {other}")),
        }
    }

    fn merge_to_map(&self, map: &Value, key: Value, value: Value) -> DataResult<Value> {
        let mut merged = match map {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => return DataResult::error(format!("Not a map: {other}")),
        };
        match key {
            Value::String(key) => {
                merged.insert(key, value);
                DataResult::success(Value::Object(merged))
            }
            other => DataResult::error_with_partial(
                format!("Not a string: {other}"),
                Value::Object(merged),
            ),
        }
    }

    fn merge_maps(&self, first: &Value, second: &Value) -> DataResult<Value> {
        let mut merged = match first {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => return DataResult::error(format!("Not a map: {other}")),
        };
        match second {
            Value::Object(map) => {
                for (key, value) in map {
                    merged.insert(key.clone(), value.clone());
                }
                DataResult::success(Value::Object(merged))
            }
            other => DataResult::error_with_partial(
                format!("Not a map: {other}"),
                Value::Object(merged),
            ),
        }
    }

    fn get_field(&self, value: &Value, name: &str) -> Option<Value> {
        value.as_object().and_then(|map| map.get(name)).cloned()
    }

    fn set_field(&self, value: &Value, name: &str, field: Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut map = map.clone();
                map.insert(name.to_owned(), field);
                Value::Object(map)
            }
            other => other.clone(),
        }
    }

    fn remove_field(&self, value: &Value, name: &str) -> Value {
        match value {
            Value::Object(map) => {
                let mut map = map.clone();
                map.shift_remove(name);
                Value::Object(map)
            }
            other => other.clone(),
        }
    }

    fn has_field(&self, value: &Value, name: &str) -> bool {
        value
            .as_object()
            .is_some_and(|map| map.contains_key(name))
    }
}
