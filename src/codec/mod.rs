//! Bi-directional carrier/value mappers.
//!
//! A [`Codec`] encodes a typed value into any carrier and decodes it back,
//! threading [`DataResult`] throughout. Combinators build bigger codecs out
//! of smaller ones; [`map::MapCodec`] is the restricted form operating on
//! map-shaped carriers, and [`record::record`] assembles record codecs from
//! named fields.

pub mod map;
pub mod record;

use std::marker::PhantomData;

use itertools::Either;

use crate::{
    ops::{
        DynamicOps,
        Number,
    },
    result::DataResult,
};

pub use self::{
    map::{
        MapCodec,
        point,
    },
    record::record,
};

/// A bi-directional mapping between a value type and any carrier.
///
/// `encode` merges the encoded form with a `prefix` value so codecs can be
/// chained; `decode` returns the value alongside the unconsumed remainder of
/// the input.
pub trait Codec: Send + Sync {
    /// The decoded value type.
    type Value;

    /// Encodes a value, merging with `prefix`.
    fn encode<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value>;

    /// Decodes a value, returning the remainder of the input.
    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(Self::Value, O::Value)>;

    /// Encodes a value starting from the empty prefix.
    fn encode_start<O: DynamicOps>(&self, ops: O, value: &Self::Value) -> DataResult<O::Value> {
        self.encode(value, ops, ops.empty())
    }

    /// Decodes a value, discarding the remainder.
    fn parse<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<Self::Value> {
        self.decode(ops, input).map(|(value, _)| value)
    }

    /// Maps the value type through a bijection.
    fn xmap<B, F, G>(self, to: F, from: G) -> Xmap<Self, B, F, G>
    where
        Self: Sized,
        F: Fn(Self::Value) -> B + Send + Sync,
        G: Fn(&B) -> Self::Value + Send + Sync,
    {
        Xmap {
            inner: self,
            to,
            from,
            _marker: PhantomData,
        }
    }

    /// Maps the value type through functions failable in both directions.
    fn flat_xmap<B, F, G>(self, to: F, from: G) -> FlatXmap<Self, B, F, G>
    where
        Self: Sized,
        F: Fn(Self::Value) -> DataResult<B> + Send + Sync,
        G: Fn(&B) -> DataResult<Self::Value> + Send + Sync,
    {
        FlatXmap {
            inner: self,
            to,
            from,
            _marker: PhantomData,
        }
    }

    /// Maps the value type; only decoding may fail.
    fn comap_flat_map<B, F, G>(self, to: F, from: G) -> ComapFlatMap<Self, B, F, G>
    where
        Self: Sized,
        F: Fn(Self::Value) -> DataResult<B> + Send + Sync,
        G: Fn(&B) -> Self::Value + Send + Sync,
    {
        ComapFlatMap {
            inner: self,
            to,
            from,
            _marker: PhantomData,
        }
    }

    /// Maps the value type; only encoding may fail.
    fn flat_comap_map<B, F, G>(self, to: F, from: G) -> FlatComapMap<Self, B, F, G>
    where
        Self: Sized,
        F: Fn(Self::Value) -> B + Send + Sync,
        G: Fn(&B) -> DataResult<Self::Value> + Send + Sync,
    {
        FlatComapMap {
            inner: self,
            to,
            from,
            _marker: PhantomData,
        }
    }

    /// A codec for homogeneous lists of this codec's value.
    fn list_of(self) -> ListOf<Self>
    where
        Self: Sized,
    {
        ListOf { inner: self }
    }

    /// A codec for optional values; the empty carrier decodes to `None`.
    fn optional_of(self) -> OptionalOf<Self>
    where
        Self: Sized,
    {
        OptionalOf { inner: self }
    }

    /// Tries this codec, falling back to `other` in both directions.
    fn or_else<C>(self, other: C) -> OrElse<Self, C>
    where
        Self: Sized,
        C: Codec<Value = Self::Value>,
    {
        OrElse { first: self, second: other }
    }

    /// Prepends `prefix: ` to every error message.
    fn with_error_context(self, prefix: impl Into<String>) -> ErrorContext<Self>
    where
        Self: Sized,
    {
        ErrorContext {
            prefix: prefix.into(),
            inner: self,
        }
    }

    /// Promotes to a map codec reading a required named field.
    fn field_of(self, name: impl Into<String>) -> map::Field<Self>
    where
        Self: Sized,
    {
        map::Field::new(name, self)
    }

    /// Promotes to a map codec reading an optional named field.
    fn optional_field_of(self, name: impl Into<String>) -> map::OptionalField<Self>
    where
        Self: Sized,
    {
        map::OptionalField::new(name, self)
    }

    /// Promotes to a map codec reading a named field with a default.
    ///
    /// Values equal to the default are omitted on encode.
    fn optional_field_of_or(
        self,
        name: impl Into<String>,
        default: Self::Value,
    ) -> map::DefaultedField<Self>
    where
        Self: Sized,
        Self::Value: Clone + PartialEq + Send + Sync,
    {
        map::DefaultedField::new(name, self, default)
    }
}

fn append_primitive<O: DynamicOps>(
    ops: O,
    prefix: O::Value,
    value: O::Value,
) -> DataResult<O::Value> {
    if ops.is_null(&prefix) {
        DataResult::success(value)
    } else {
        DataResult::error_with_partial(
            format!("Cannot append a primitive to {prefix:?}"),
            value,
        )
    }
}

/// Codec for booleans.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoolCodec;

impl Codec for BoolCodec {
    type Value = bool;

    fn encode<O: DynamicOps>(&self, value: &bool, ops: O, prefix: O::Value) -> DataResult<O::Value> {
        append_primitive(ops, prefix, ops.create_bool(*value))
    }

    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(bool, O::Value)> {
        ops.get_bool(input).map(|value| (value, ops.empty()))
    }
}

/// Codec for strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringCodec;

impl Codec for StringCodec {
    type Value = String;

    fn encode<O: DynamicOps>(
        &self,
        value: &String,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        append_primitive(ops, prefix, ops.create_string(value))
    }

    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(String, O::Value)> {
        ops.get_string(input).map(|value| (value, ops.empty()))
    }
}

macro_rules! numeric_codec {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $read:expr, $write:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $name;

        impl Codec for $name {
            type Value = $ty;

            fn encode<O: DynamicOps>(
                &self,
                value: &$ty,
                ops: O,
                prefix: O::Value,
            ) -> DataResult<O::Value> {
                let write: fn(&$ty) -> Number = $write;
                append_primitive(ops, prefix, ops.create_number(write(value)))
            }

            fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<($ty, O::Value)> {
                let read: fn(Number) -> $ty = $read;
                ops.get_number(input).map(|n| (read(n), ops.empty()))
            }
        }
    };
}

numeric_codec!(
    /// Codec for byte-width integers.
    ByteCodec,
    i8,
    |n| n.to_i64() as i8,
    |v| Number::Int(i64::from(*v))
);
numeric_codec!(
    /// Codec for short-width integers.
    ShortCodec,
    i16,
    |n| n.to_i64() as i16,
    |v| Number::Int(i64::from(*v))
);
numeric_codec!(
    /// Codec for int-width integers.
    IntCodec,
    i32,
    |n| n.to_i64() as i32,
    |v| Number::Int(i64::from(*v))
);
numeric_codec!(
    /// Codec for long-width integers.
    LongCodec,
    i64,
    |n| n.to_i64(),
    |v| Number::Int(*v)
);
numeric_codec!(
    /// Codec for single-precision floats.
    FloatCodec,
    f32,
    |n| n.to_f64() as f32,
    |v| Number::Float(f64::from(*v))
);
numeric_codec!(
    /// Codec for double-precision floats.
    DoubleCodec,
    f64,
    |n| n.to_f64(),
    |v| Number::Float(*v)
);

/// Codec for booleans.
pub const BOOL: BoolCodec = BoolCodec;
/// Codec for strings.
pub const STRING: StringCodec = StringCodec;
/// Codec for byte-width integers.
pub const BYTE: ByteCodec = ByteCodec;
/// Codec for short-width integers.
pub const SHORT: ShortCodec = ShortCodec;
/// Codec for int-width integers.
pub const INT: IntCodec = IntCodec;
/// Codec for long-width integers.
pub const LONG: LongCodec = LongCodec;
/// Codec for single-precision floats.
pub const FLOAT: FloatCodec = FloatCodec;
/// Codec for double-precision floats.
pub const DOUBLE: DoubleCodec = DoubleCodec;

macro_rules! range_codec {
    ($(#[$meta:meta])* $name:ident, $builder:ident, $base:expr, $ty:ty) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug)]
        pub struct $name {
            min: $ty,
            max: $ty,
        }

        $(#[$meta])*
        pub fn $builder(min: $ty, max: $ty) -> $name {
            $name { min, max }
        }

        impl $name {
            fn check(&self, value: $ty) -> DataResult<$ty> {
                if value < self.min || value > self.max {
                    DataResult::error(format!(
                        "Value {value} outside of range [{min},{max}]",
                        min = self.min,
                        max = self.max,
                    ))
                } else {
                    DataResult::success(value)
                }
            }
        }

        impl Codec for $name {
            type Value = $ty;

            fn encode<O: DynamicOps>(
                &self,
                value: &$ty,
                ops: O,
                prefix: O::Value,
            ) -> DataResult<O::Value> {
                self.check(*value).and_then(|value| $base.encode(&value, ops, prefix))
            }

            fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<($ty, O::Value)> {
                $base
                    .decode(ops, input)
                    .and_then(|(value, rest)| self.check(value).map(|value| (value, rest)))
            }
        }
    };
}

range_codec!(
    /// Codec for int-width integers validated against an inclusive range.
    IntRange,
    int_range,
    INT,
    i32
);
range_codec!(
    /// Codec for single-precision floats validated against an inclusive range.
    FloatRange,
    float_range,
    FLOAT,
    f32
);
range_codec!(
    /// Codec for double-precision floats validated against an inclusive range.
    DoubleRange,
    double_range,
    DOUBLE,
    f64
);

/// See [`Codec::xmap`].
pub struct Xmap<C, B, F, G> {
    inner: C,
    to: F,
    from: G,
    _marker: PhantomData<fn() -> B>,
}

impl<C, B, F, G> Codec for Xmap<C, B, F, G>
where
    C: Codec,
    F: Fn(C::Value) -> B + Send + Sync,
    G: Fn(&B) -> C::Value + Send + Sync,
{
    type Value = B;

    fn encode<O: DynamicOps>(&self, value: &B, ops: O, prefix: O::Value) -> DataResult<O::Value> {
        self.inner.encode(&(self.from)(value), ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.inner
            .decode(ops, input)
            .map(|(value, rest)| ((self.to)(value), rest))
    }
}

/// See [`Codec::flat_xmap`].
pub struct FlatXmap<C, B, F, G> {
    inner: C,
    to: F,
    from: G,
    _marker: PhantomData<fn() -> B>,
}

impl<C, B, F, G> Codec for FlatXmap<C, B, F, G>
where
    C: Codec,
    F: Fn(C::Value) -> DataResult<B> + Send + Sync,
    G: Fn(&B) -> DataResult<C::Value> + Send + Sync,
{
    type Value = B;

    fn encode<O: DynamicOps>(&self, value: &B, ops: O, prefix: O::Value) -> DataResult<O::Value> {
        (self.from)(value).and_then(|inner| self.inner.encode(&inner, ops, prefix))
    }

    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.inner
            .decode(ops, input)
            .and_then(|(value, rest)| (self.to)(value).map(|value| (value, rest)))
    }
}

/// See [`Codec::comap_flat_map`].
pub struct ComapFlatMap<C, B, F, G> {
    inner: C,
    to: F,
    from: G,
    _marker: PhantomData<fn() -> B>,
}

impl<C, B, F, G> Codec for ComapFlatMap<C, B, F, G>
where
    C: Codec,
    F: Fn(C::Value) -> DataResult<B> + Send + Sync,
    G: Fn(&B) -> C::Value + Send + Sync,
{
    type Value = B;

    fn encode<O: DynamicOps>(&self, value: &B, ops: O, prefix: O::Value) -> DataResult<O::Value> {
        self.inner.encode(&(self.from)(value), ops, prefix)
    }

    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.inner
            .decode(ops, input)
            .and_then(|(value, rest)| (self.to)(value).map(|value| (value, rest)))
    }
}

/// See [`Codec::flat_comap_map`].
pub struct FlatComapMap<C, B, F, G> {
    inner: C,
    to: F,
    from: G,
    _marker: PhantomData<fn() -> B>,
}

impl<C, B, F, G> Codec for FlatComapMap<C, B, F, G>
where
    C: Codec,
    F: Fn(C::Value) -> B + Send + Sync,
    G: Fn(&B) -> DataResult<C::Value> + Send + Sync,
{
    type Value = B;

    fn encode<O: DynamicOps>(&self, value: &B, ops: O, prefix: O::Value) -> DataResult<O::Value> {
        (self.from)(value).and_then(|inner| self.inner.encode(&inner, ops, prefix))
    }

    fn decode<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<(B, O::Value)> {
        self.inner
            .decode(ops, input)
            .map(|(value, rest)| ((self.to)(value), rest))
    }
}

/// See [`Codec::list_of`].
pub struct ListOf<C> {
    inner: C,
}

impl<C: Codec> Codec for ListOf<C> {
    type Value = Vec<C::Value>;

    fn encode<O: DynamicOps>(
        &self,
        value: &Vec<C::Value>,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        let mut encoded = Vec::with_capacity(value.len());
        let mut errors: Vec<String> = Vec::new();
        for item in value {
            match self.inner.encode_start(ops, item) {
                DataResult::Success(item) => encoded.push(item),
                DataResult::Error(error) => errors.push(error.message().to_owned()),
            }
        }

        let list = if ops.is_null(&prefix) {
            ops.create_list(encoded.into_iter())
        } else {
            let mut list = DataResult::success(prefix);
            for item in encoded {
                list = list.and_then(|list| ops.merge_to_list(&list, item));
            }
            match list {
                DataResult::Success(list) => list,
                error => return error,
            }
        };

        if errors.is_empty() {
            DataResult::success(list)
        } else {
            DataResult::error_with_partial(errors.join("; "), list)
        }
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Vec<C::Value>, O::Value)> {
        ops.get_list(input).and_then(|items| {
            let mut values = Vec::with_capacity(items.len());
            let mut errors: Vec<String> = Vec::new();
            for item in &items {
                match self.inner.parse(ops, item) {
                    DataResult::Success(value) => values.push(value),
                    DataResult::Error(error) => errors.push(error.message().to_owned()),
                }
            }
            if errors.is_empty() {
                DataResult::success((values, ops.empty()))
            } else {
                DataResult::error_with_partial(errors.join("; "), (values, ops.empty()))
            }
        })
    }
}

/// See [`Codec::optional_of`].
pub struct OptionalOf<C> {
    inner: C,
}

impl<C: Codec> Codec for OptionalOf<C> {
    type Value = Option<C::Value>;

    fn encode<O: DynamicOps>(
        &self,
        value: &Option<C::Value>,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match value {
            Some(value) => self.inner.encode(value, ops, prefix),
            None => DataResult::success(prefix),
        }
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Option<C::Value>, O::Value)> {
        if ops.is_null(input) {
            DataResult::success((None, ops.empty()))
        } else {
            self.inner
                .decode(ops, input)
                .map(|(value, rest)| (Some(value), rest))
        }
    }
}

/// See [`Codec::or_else`].
pub struct OrElse<C1, C2> {
    first: C1,
    second: C2,
}

impl<C1, C2> Codec for OrElse<C1, C2>
where
    C1: Codec,
    C2: Codec<Value = C1::Value>,
{
    type Value = C1::Value;

    fn encode<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match self.first.encode(value, ops, prefix.clone()) {
            DataResult::Success(encoded) => DataResult::success(encoded),
            DataResult::Error(first) => match self.second.encode(value, ops, prefix) {
                DataResult::Success(encoded) => DataResult::success(encoded),
                DataResult::Error(second) => {
                    DataResult::error(format!("{}; {}", first.message(), second.message()))
                }
            },
        }
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Self::Value, O::Value)> {
        match self.first.decode(ops, input) {
            DataResult::Success(decoded) => DataResult::success(decoded),
            DataResult::Error(first) => match self.second.decode(ops, input) {
                DataResult::Success(decoded) => DataResult::success(decoded),
                DataResult::Error(second) => {
                    DataResult::error(format!("{}; {}", first.message(), second.message()))
                }
            },
        }
    }
}

/// See [`Codec::with_error_context`].
pub struct ErrorContext<C> {
    prefix: String,
    inner: C,
}

impl<C: Codec> Codec for ErrorContext<C> {
    type Value = C::Value;

    fn encode<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        self.inner
            .encode(value, ops, prefix)
            .map_err(|message| format!("{}: {message}", self.prefix))
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Self::Value, O::Value)> {
        self.inner
            .decode(ops, input)
            .map_err(|message| format!("{}: {message}", self.prefix))
    }
}

/// A codec for pairs: the first codec's remainder feeds the second.
pub struct PairCodec<C1, C2> {
    first: C1,
    second: C2,
}

/// Builds a [`PairCodec`].
pub fn pair<C1: Codec, C2: Codec>(first: C1, second: C2) -> PairCodec<C1, C2> {
    PairCodec { first, second }
}

impl<C1: Codec, C2: Codec> Codec for PairCodec<C1, C2> {
    type Value = (C1::Value, C2::Value);

    fn encode<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        self.first
            .encode(&value.0, ops, prefix)
            .and_then(|prefix| self.second.encode(&value.1, ops, prefix))
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Self::Value, O::Value)> {
        self.first.decode(ops, input).and_then(|(first, rest)| {
            self.second
                .decode(ops, &rest)
                .map(|(second, rest)| ((first, second), rest))
        })
    }
}

/// A codec for one of two alternatives, tried left first.
pub struct EitherCodec<L, R> {
    left: L,
    right: R,
}

/// Builds an [`EitherCodec`].
pub fn either<L: Codec, R: Codec>(left: L, right: R) -> EitherCodec<L, R> {
    EitherCodec { left, right }
}

impl<L: Codec, R: Codec> Codec for EitherCodec<L, R> {
    type Value = Either<L::Value, R::Value>;

    fn encode<O: DynamicOps>(
        &self,
        value: &Self::Value,
        ops: O,
        prefix: O::Value,
    ) -> DataResult<O::Value> {
        match value {
            Either::Left(value) => self.left.encode(value, ops, prefix),
            Either::Right(value) => self.right.encode(value, ops, prefix),
        }
    }

    fn decode<O: DynamicOps>(
        &self,
        ops: O,
        input: &O::Value,
    ) -> DataResult<(Self::Value, O::Value)> {
        match self.left.decode(ops, input) {
            DataResult::Success((value, rest)) => {
                DataResult::success((Either::Left(value), rest))
            }
            DataResult::Error(left) => match self.right.decode(ops, input) {
                DataResult::Success((value, rest)) => {
                    DataResult::success((Either::Right(value), rest))
                }
                DataResult::Error(right) => {
                    DataResult::error(format!("{}; {}", left.message(), right.message()))
                }
            },
        }
    }
}
