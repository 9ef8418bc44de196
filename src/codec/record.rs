//! Record codecs assembled from named fields.
//!
//! [`record`] combines a tuple of [`RecordField`]s with a constructor into a
//! [`MapCodec`] for the record type. Impls for arities 1 through 12 are
//! generated with [`all_tuples!`].

use std::marker::PhantomData;

use variadics_please::all_tuples;

use crate::{
    codec::map::MapCodec,
    ops::DynamicOps,
    result::DataResult,
};

/// A map codec paired with the getter that extracts its field from the
/// record being encoded. Built with
/// [`MapCodec::for_getter`](crate::codec::map::MapCodec::for_getter).
pub struct RecordField<C, A, G> {
    codec: C,
    getter: G,
    _marker: PhantomData<fn(&A)>,
}

impl<C, A, G> RecordField<C, A, G>
where
    C: MapCodec,
    G: Fn(&A) -> C::Value + Send + Sync,
{
    pub(crate) fn new(codec: C, getter: G) -> Self {
        Self {
            codec,
            getter,
            _marker: PhantomData,
        }
    }
}

/// A record codec: a tuple of fields plus a constructor.
pub struct RecordCodec<Fields, Ctor> {
    fields: Fields,
    ctor: Ctor,
}

/// Combines field codecs into a record codec.
///
/// Fields decode in declaration order; a missing required field yields
/// `Missing field '<name>'`, and the messages of every failing field are
/// concatenated.
///
/// ```
/// use datafix::codec::{Codec, MapCodec, record, INT, STRING};
///
/// #[derive(Debug, PartialEq, Clone)]
/// struct Settings {
///     name: String,
///     timeout: i32,
/// }
///
/// let codec = record(
///     (
///         STRING.field_of("name").for_getter(|s: &Settings| s.name.clone()),
///         INT.optional_field_of_or("timeout", 30).for_getter(|s: &Settings| s.timeout),
///     ),
///     |name, timeout| Settings { name, timeout },
/// )
/// .codec();
/// ```
pub fn record<Fields, Ctor>(fields: Fields, ctor: Ctor) -> RecordCodec<Fields, Ctor> {
    RecordCodec { fields, ctor }
}

macro_rules! impl_record_codec {
    ($(($C:ident, $G:ident, $v:ident)),*) => {
        impl<A, Ctor, $($C, $G),*> MapCodec for RecordCodec<($(RecordField<$C, A, $G>,)*), Ctor>
        where
            Ctor: Fn($($C::Value),*) -> A + Send + Sync,
            A: Send + Sync,
            $(
                $C: MapCodec,
                $G: Fn(&A) -> $C::Value + Send + Sync,
            )*
        {
            type Value = A;

            fn encode_entries<O: DynamicOps>(
                &self,
                value: &A,
                ops: O,
                map: O::Value,
            ) -> DataResult<O::Value> {
                let ($($v,)*) = &self.fields;
                let result = DataResult::success(map);
                $(
                    let field_value = ($v.getter)(value);
                    let result = result.and_then(|map| {
                        $v.codec.encode_entries(&field_value, ops, map)
                    });
                )*
                result
            }

            fn decode_entries<O: DynamicOps>(&self, ops: O, input: &O::Value) -> DataResult<A> {
                let ($($v,)*) = &self.fields;
                $(
                    let $v = $v.codec.decode_entries(ops, input);
                )*
                match ($($v,)*) {
                    ($(DataResult::Success($v),)*) => DataResult::success((self.ctor)($($v),*)),
                    ($($v,)*) => {
                        let mut message = String::new();
                        $(
                            if let DataResult::Error(error) = &$v {
                                if !message.is_empty() {
                                    message.push_str("; ");
                                }
                                message.push_str(error.message());
                            }
                        )*
                        DataResult::error(message)
                    }
                }
            }
        }
    };
}

all_tuples!(impl_record_codec, 1, 12, C, G, v);
