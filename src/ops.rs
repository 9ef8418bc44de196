//! [`DynamicOps`] is the capability trait that makes any tree-shaped carrier
//! usable by the fixer.

use std::fmt;

use crate::result::DataResult;

/// A numeric carrier value.
///
/// Carriers expose exactly two widths: lossless integers up to `i64` and
/// `f64` floating point. The narrower constructor helpers on [`DynamicOps`]
/// widen losslessly on write; readers narrow with Java-style truncation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Number {
    /// An integral value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
}

impl Number {
    /// The value as an `i64`, truncating floats toward zero.
    pub fn to_i64(self) -> i64 {
        match self {
            Self::Int(value) => value,
            Self::Float(value) => value as i64,
        }
    }

    /// The value as an `f64`.
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Capability interface over a concrete tree-shaped carrier type.
///
/// This is the only thing the rest of the crate knows about a serialization
/// format. Implementations are zero-sized `Copy` singletons; every mutating
/// method is copy-on-write and source values are never observably mutated.
/// Map entry order is part of the contract: implementations must preserve
/// insertion order, or document themselves as unordered and sort keys
/// lexicographically.
pub trait DynamicOps: Copy + PartialEq + Send + Sync + 'static {
    /// The carrier type.
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// A short name for diagnostics, such as `"json"`.
    fn name(&self) -> &'static str;

    /// The empty value. Never absent: backends without a native null return
    /// a sentinel that [`DynamicOps::is_null`] recognises.
    fn empty(&self) -> Self::Value;

    /// An empty map.
    fn empty_map(&self) -> Self::Value {
        self.create_map(std::iter::empty())
    }

    /// An empty list.
    fn empty_list(&self) -> Self::Value {
        self.create_list(std::iter::empty())
    }

    /// Whether `value` is the empty sentinel.
    fn is_null(&self, value: &Self::Value) -> bool;

    /// Whether `value` is map-shaped.
    fn is_map(&self, value: &Self::Value) -> bool;

    /// Whether `value` is list-shaped.
    fn is_list(&self, value: &Self::Value) -> bool;

    /// Whether `value` is a string.
    fn is_string(&self, value: &Self::Value) -> bool;

    /// Whether `value` is numeric.
    fn is_number(&self, value: &Self::Value) -> bool;

    /// Whether `value` is a boolean.
    fn is_bool(&self, value: &Self::Value) -> bool;

    /// Creates a boolean.
    fn create_bool(&self, value: bool) -> Self::Value;

    /// Creates a number.
    fn create_number(&self, value: Number) -> Self::Value;

    /// Creates a string.
    fn create_string(&self, value: &str) -> Self::Value;

    /// Creates a byte-width integer.
    fn create_byte(&self, value: i8) -> Self::Value {
        self.create_number(Number::Int(i64::from(value)))
    }

    /// Creates a short-width integer.
    fn create_short(&self, value: i16) -> Self::Value {
        self.create_number(Number::Int(i64::from(value)))
    }

    /// Creates an int-width integer.
    fn create_int(&self, value: i32) -> Self::Value {
        self.create_number(Number::Int(i64::from(value)))
    }

    /// Creates a long-width integer.
    fn create_long(&self, value: i64) -> Self::Value {
        self.create_number(Number::Int(value))
    }

    /// Creates a single-precision float.
    fn create_float(&self, value: f32) -> Self::Value {
        self.create_number(Number::Float(f64::from(value)))
    }

    /// Creates a double-precision float.
    fn create_double(&self, value: f64) -> Self::Value {
        self.create_number(Number::Float(value))
    }

    /// Reads a boolean.
    fn get_bool(&self, value: &Self::Value) -> DataResult<bool>;

    /// Reads a number.
    fn get_number(&self, value: &Self::Value) -> DataResult<Number>;

    /// Reads a string.
    fn get_string(&self, value: &Self::Value) -> DataResult<String>;

    /// Builds a list from elements.
    fn create_list(&self, items: impl Iterator<Item = Self::Value>) -> Self::Value;

    /// Destructures a list into its elements.
    fn get_list(&self, value: &Self::Value) -> DataResult<Vec<Self::Value>>;

    /// Appends an element to a list, copy-on-write. The empty value counts
    /// as an empty list.
    fn merge_to_list(&self, list: &Self::Value, element: Self::Value) -> DataResult<Self::Value>;

    /// Builds a map from key/value pairs, preserving input order. Entries
    /// whose key is null or does not read as a string are dropped.
    fn create_map(&self, entries: impl Iterator<Item = (Self::Value, Self::Value)>)
    -> Self::Value;

    /// Destructures a map into its entries, in the backend's natural order.
    fn get_map_entries(&self, value: &Self::Value) -> DataResult<Vec<(Self::Value, Self::Value)>>;

    /// Inserts an entry into a map, copy-on-write. The empty value counts as
    /// an empty map.
    fn merge_to_map(
        &self,
        map: &Self::Value,
        key: Self::Value,
        value: Self::Value,
    ) -> DataResult<Self::Value>;

    /// Merges every entry of `second` into `first`, copy-on-write.
    fn merge_maps(&self, first: &Self::Value, second: &Self::Value) -> DataResult<Self::Value>;

    /// Reads a named field from a map-shaped value.
    fn get_field(&self, value: &Self::Value, name: &str) -> Option<Self::Value>;

    /// Sets a named field, copy-on-write. Non-map values are returned
    /// unchanged.
    fn set_field(&self, value: &Self::Value, name: &str, field: Self::Value) -> Self::Value;

    /// Removes a named field, copy-on-write, preserving the order of the
    /// remaining entries. Non-map values are returned unchanged.
    fn remove_field(&self, value: &Self::Value, name: &str) -> Self::Value;

    /// Whether a map-shaped value has a named field.
    fn has_field(&self, value: &Self::Value, name: &str) -> bool;

    /// Recursively converts a value of this carrier into another carrier.
    ///
    /// Primitives are probed in the order boolean, number, string, list,
    /// map, falling back to the target's empty value, because most backends'
    /// integer and boolean representations overlap and boolean must win.
    fn convert_to<O: DynamicOps>(&self, target: O, value: &Self::Value) -> O::Value {
        if self.is_bool(value) {
            if let Some(b) = self.get_bool(value).ok() {
                return target.create_bool(b);
            }
        }
        if self.is_number(value) {
            if let Some(n) = self.get_number(value).ok() {
                return target.create_number(n);
            }
        }
        if self.is_string(value) {
            if let Some(s) = self.get_string(value).ok() {
                return target.create_string(&s);
            }
        }
        if self.is_list(value) {
            if let Some(items) = self.get_list(value).ok() {
                return target.create_list(items.iter().map(|item| self.convert_to(target, item)));
            }
        }
        if self.is_map(value) {
            if let Some(entries) = self.get_map_entries(value).ok() {
                return target.create_map(
                    entries
                        .iter()
                        .map(|(k, v)| (self.convert_to(target, k), self.convert_to(target, v))),
                );
            }
        }
        target.empty()
    }
}
