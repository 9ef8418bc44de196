//! Codecs restricted to map-shaped carriers.
//!
//! A [`MapCodec`] produces and consumes map entries rather than arbitrary
//! values, which is what lets record codecs compose field-by-field without
//! re-encoding the whole map per field.

use crate::{
    codec::Codec,
    ops::DynamicOps,
    result::DataResult,
};

/// A codec over map-shaped carriers.
pub trait MapCodec: Send + Sync {
    /// The decoded value type.
    type Value;

    /// Encodes the value's entries into `map`.
    fn encode_entries<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        map: O::Value,
    ) -> DataResult<O::Value>;

    /// Decodes the value from the entries of `input`.
    fn decode_entries<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<Self::Value>;

    /// Promotes to a full [`Codec`] over map-shaped values.
    fn codec(self) -> MapAsCodec<Self>
    where
        Self: Sized,
    {
        MapAsCodec { inner: self }
    }

    /// Pairs this map codec with the getter that extracts its field from a
    /// record, for use with [`record`](crate::codec::record::record).
    fn for_getter<A, G>(self, getter: G) -> crate::codec::record::RecordField<Self, A, G>
    where
        Self: Sized,
        G: Fn(&A) -> Self::Value + Send + Sync,
    {
        crate::codec::record::RecordField::new(self, getter)
    }
}

/// See [`MapCodec::codec`].
pub struct MapAsCodec<C> {
    inner: C,
}

impl<C: MapCodec> Codec for MapAsCodec<C> {
    type Value = C::Value;

    fn encode<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        let map = if ops.is_null(&prefix) {
            ops.empty_map()
        } else if ops.is_map(&prefix) {
            prefix
        } else {
            return DataResult::error(format!("Not a map: {prefix:?}"));
        };
        self.inner.encode_entries(value, ops, map)
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Self::Value, O::Value)> {
        if !ops.is_map(input) {
            return DataResult::error(format!("Not a map: {input:?}"));
        }
        self.inner
            .decode_entries(ops, input)
            .map(|value| (value, input.clone()))
    }
}

/// A required named field. See [`Codec::field_of`].
pub struct Field<C> {
    name: String,
    inner: C,
}

impl<C> Field<C> {
    pub(crate) fn new(name: impl Into<String>, inner: C) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

impl<C: Codec> MapCodec for Field<C> {
    type Value = C::Value;

    fn encode_entries<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        map: O::Value,
    ) -> DataResult<O::Value> {
        self.inner.encode_start(ops, value).and_then(|encoded| {
            ops.merge_to_map(&map, ops.create_string(&self.name), encoded)
        })
    }

    fn decode_entries<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<Self::Value> {
        match ops.get_field(input, &self.name) {
            Some(field) => self.inner.parse(ops, &field),
            None => DataResult::error(format!("Missing field '{}'", self.name)),
        }
    }
}

/// An optional named field decoding to `Option`. See
/// [`Codec::optional_field_of`].
pub struct OptionalField<C> {
    name: String,
    inner: C,
}

impl<C> OptionalField<C> {
    pub(crate) fn new(name: impl Into<String>, inner: C) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }
}

impl<C: Codec> MapCodec for OptionalField<C> {
    type Value = Option<C::Value>;

    fn encode_entries<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        map: O::Value,
    ) -> DataResult<O::Value> {
        match value {
            Some(value) => self.inner.encode_start(ops, value).and_then(|encoded| {
                ops.merge_to_map(&map, ops.create_string(&self.name), encoded)
            }),
            None => DataResult::success(map),
        }
    }

    fn decode_entries<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<Self::Value> {
        match ops.get_field(input, &self.name) {
            Some(field) => self.inner.parse(ops, &field).map(Some),
            None => DataResult::success(None),
        }
    }
}

/// An optional named field with a default. See
/// [`Codec::optional_field_of_or`].
pub struct DefaultedField<C: Codec> {
    name: String,
    inner: C,
    default: C::Value,
}

impl<C: Codec> DefaultedField<C> {
    pub(crate) fn new(name: impl Into<String>, inner: C, default: C::Value) -> Self {
        Self {
            name: name.into(),
            inner,
            default,
        }
    }
}

impl<C> MapCodec for DefaultedField<C>
where
    C: Codec,
    C::Value: Clone + PartialEq + Send + Sync,
{
    type Value = C::Value;

    fn encode_entries<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        map: O::Value,
    ) -> DataResult<O::Value> {
        if *value == self.default {
            return DataResult::success(map);
        }
        self.inner.encode_start(ops, value).and_then(|encoded| {
            ops.merge_to_map(&map, ops.create_string(&self.name), encoded)
        })
    }

    fn decode_entries<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<Self::Value> {
        match ops.get_field(input, &self.name) {
            Some(field) => self.inner.parse(ops, &field),
            None => DataResult::success(self.default.clone()),
        }
    }
}

/// A constant map codec: decodes to a fixed value, encodes nothing.
pub struct Point<A> {
    value: A,
}

/// Builds a [`Point`].
pub fn point<A: Clone + Send + Sync>(value: A) -> Point<A> {
    Point { value }
}

impl<A: Clone + Send + Sync> MapCodec for Point<A> {
    type Value = A;

    fn encode_entries<O: DynamicOps>(
        &self,
        _value: &A,
        _ops: O,
        map: O::Value,
    ) -> DataResult<O::Value> {
        DataResult::success(map)
    }

    fn decode_entries<O: DynamicOps>(&self, _ops: O, _input: &O::Value) -> DataResult<A> {
        DataResult::success(self.value.clone())
    }
}
