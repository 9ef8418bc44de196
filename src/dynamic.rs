//! [`Dynamic`] pairs a carrier value with its [`DynamicOps`], offering a
//! fluent, carrier-agnostic read/modify surface.

use std::fmt;

use crate::{
    ops::{
        DynamicOps,
        Number,
    },
    result::DataResult,
    version::TypeReference,
};

/// A carrier value paired with its ops.
///
/// Every reader returns a [`DataResult`]; every writer returns a fresh
/// `Dynamic`, leaving the receiver untouched. Two dynamics are equal iff
/// their ops are the same singleton and their carriers are equal; the former
/// is guaranteed by sharing the `O` type parameter.
#[derive(Clone, PartialEq)]
pub struct Dynamic<O: DynamicOps> {
    ops: O,
    value: O::Value,
}

impl<O: DynamicOps> fmt::Debug for Dynamic<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic")
            .field("ops", &self.ops.name())
            .field("value", &self.value)
            .finish()
    }
}

impl<O: DynamicOps> Dynamic<O> {
    /// Wraps a carrier value.
    pub fn new(ops: O, value: O::Value) -> Self {
        Self { ops, value }
    }

    /// The ops singleton.
    pub fn ops(&self) -> O {
        self.ops
    }

    /// The carrier value.
    pub fn value(&self) -> &O::Value {
        &self.value
    }

    /// Unwraps into the carrier value.
    pub fn into_value(self) -> O::Value {
        self.value
    }

    /// Whether the carrier is the empty sentinel.
    pub fn is_null(&self) -> bool {
        self.ops.is_null(&self.value)
    }

    /// Whether the carrier is map-shaped.
    pub fn is_map(&self) -> bool {
        self.ops.is_map(&self.value)
    }

    /// Whether the carrier is list-shaped.
    pub fn is_list(&self) -> bool {
        self.ops.is_list(&self.value)
    }

    /// Whether the carrier is a string.
    pub fn is_string(&self) -> bool {
        self.ops.is_string(&self.value)
    }

    /// Whether the carrier is numeric.
    pub fn is_number(&self) -> bool {
        self.ops.is_number(&self.value)
    }

    /// Whether the carrier is a boolean.
    pub fn is_bool(&self) -> bool {
        self.ops.is_bool(&self.value)
    }

    /// Reads the carrier as a string.
    pub fn as_string(&self) -> DataResult<String> {
        self.ops.get_string(&self.value)
    }

    /// Reads the carrier as a boolean.
    pub fn as_boolean(&self) -> DataResult<bool> {
        self.ops.get_bool(&self.value)
    }

    /// Reads the carrier as a number.
    pub fn as_number(&self) -> DataResult<Number> {
        self.ops.get_number(&self.value)
    }

    /// Reads the carrier as a byte-width integer, truncating.
    pub fn as_byte(&self) -> DataResult<i8> {
        self.as_number().map(|n| n.to_i64() as i8)
    }

    /// Reads the carrier as a short-width integer, truncating.
    pub fn as_short(&self) -> DataResult<i16> {
        self.as_number().map(|n| n.to_i64() as i16)
    }

    /// Reads the carrier as an int-width integer, truncating.
    pub fn as_int(&self) -> DataResult<i32> {
        self.as_number().map(|n| n.to_i64() as i32)
    }

    /// Reads the carrier as a long-width integer, truncating.
    pub fn as_long(&self) -> DataResult<i64> {
        self.as_number().map(Number::to_i64)
    }

    /// Reads the carrier as a single-precision float.
    pub fn as_float(&self) -> DataResult<f32> {
        self.as_number().map(|n| n.to_f64() as f32)
    }

    /// Reads the carrier as a double-precision float.
    pub fn as_double(&self) -> DataResult<f64> {
        self.as_number().map(Number::to_f64)
    }

    /// Reads the carrier as a list of dynamics.
    pub fn as_list(&self) -> DataResult<Vec<Dynamic<O>>> {
        let ops = self.ops;
        self.ops
            .get_list(&self.value)
            .map(|items| items.into_iter().map(|item| Dynamic::new(ops, item)).collect())
    }

    /// Reads the carrier as a list of map entries.
    pub fn as_map(&self) -> DataResult<Vec<(Dynamic<O>, Dynamic<O>)>> {
        let ops = self.ops;
        self.ops.get_map_entries(&self.value).map(|entries| {
            entries
                .into_iter()
                .map(|(k, v)| (Dynamic::new(ops, k), Dynamic::new(ops, v)))
                .collect()
        })
    }

    /// Whether a named field exists.
    pub fn has(&self, name: &str) -> bool {
        self.ops.has_field(&self.value, name)
    }

    /// Reads a named field.
    pub fn get(&self, name: &str) -> DataResult<Dynamic<O>> {
        match self.ops.get_field(&self.value, name) {
            Some(field) => DataResult::success(Dynamic::new(self.ops, field)),
            None => DataResult::error(format!("Missing field '{name}'")),
        }
    }

    /// Reads a named field, or the empty value if it is missing.
    pub fn get_or_empty(&self, name: &str) -> Dynamic<O> {
        let field = self
            .ops
            .get_field(&self.value, name)
            .unwrap_or_else(|| self.ops.empty());
        Dynamic::new(self.ops, field)
    }

    /// Sets a named field, copy-on-write.
    pub fn set(&self, name: &str, field: Dynamic<O>) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.set_field(&self.value, name, field.value))
    }

    /// Removes a named field, copy-on-write.
    pub fn remove(&self, name: &str) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.remove_field(&self.value, name))
    }

    /// Rewrites a named field in place. A no-op if the field is missing.
    pub fn update(&self, name: &str, f: impl FnOnce(Dynamic<O>) -> Dynamic<O>) -> Dynamic<O> {
        match self.ops.get_field(&self.value, name) {
            Some(field) => self.set(name, f(Dynamic::new(self.ops, field))),
            None => self.clone(),
        }
    }

    /// The empty value with this ops.
    pub fn empty(&self) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.empty())
    }

    /// An empty map with this ops.
    pub fn empty_map(&self) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.empty_map())
    }

    /// An empty list with this ops.
    pub fn empty_list(&self) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.empty_list())
    }

    /// Creates a string with this ops.
    pub fn create_string(&self, value: &str) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_string(value))
    }

    /// Creates a boolean with this ops.
    pub fn create_boolean(&self, value: bool) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_bool(value))
    }

    /// Creates a number with this ops.
    pub fn create_number(&self, value: Number) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_number(value))
    }

    /// Creates a byte-width integer with this ops.
    pub fn create_byte(&self, value: i8) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_byte(value))
    }

    /// Creates a short-width integer with this ops.
    pub fn create_short(&self, value: i16) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_short(value))
    }

    /// Creates an int-width integer with this ops.
    pub fn create_int(&self, value: i32) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_int(value))
    }

    /// Creates a long-width integer with this ops.
    pub fn create_long(&self, value: i64) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_long(value))
    }

    /// Creates a single-precision float with this ops.
    pub fn create_float(&self, value: f32) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_float(value))
    }

    /// Creates a double-precision float with this ops.
    pub fn create_double(&self, value: f64) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_double(value))
    }

    /// Builds a list from dynamics with this ops.
    pub fn create_list(&self, items: impl Iterator<Item = Dynamic<O>>) -> Dynamic<O> {
        Dynamic::new(self.ops, self.ops.create_list(items.map(|item| item.value)))
    }

    /// Builds a map from dynamic entries with this ops.
    pub fn create_map(&self, entries: impl Iterator<Item = (Dynamic<O>, Dynamic<O>)>) -> Dynamic<O> {
        Dynamic::new(
            self.ops,
            self.ops
                .create_map(entries.map(|(k, v)| (k.value, v.value))),
        )
    }

    /// Deeply re-encodes the carrier with another backend.
    pub fn convert<P: DynamicOps>(&self, target: P) -> Dynamic<P> {
        Dynamic::new(target, self.ops.convert_to(target, &self.value))
    }

    /// Escape hatch: rewrites the carrier directly, preserving the ops.
    pub fn map_value(self, f: impl FnOnce(O::Value) -> O::Value) -> Dynamic<O> {
        Dynamic::new(self.ops, f(self.value))
    }
}

/// A dynamic that carries its own type tag, used at the edge of the fixer
/// driver.
#[derive(Clone, PartialEq, Debug)]
pub struct TaggedDynamic<O: DynamicOps> {
    reference: TypeReference,
    dynamic: Dynamic<O>,
}

impl<O: DynamicOps> TaggedDynamic<O> {
    /// Tags a dynamic with the kind of data it holds.
    pub fn new(reference: TypeReference, dynamic: Dynamic<O>) -> Self {
        Self { reference, dynamic }
    }

    /// The type tag.
    pub fn reference(&self) -> &TypeReference {
        &self.reference
    }

    /// The tagged dynamic.
    pub fn dynamic(&self) -> &Dynamic<O> {
        &self.dynamic
    }

    /// Unwraps into the tag and the dynamic.
    pub fn into_parts(self) -> (TypeReference, Dynamic<O>) {
        (self.reference, self.dynamic)
    }
}
