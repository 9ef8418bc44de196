//! [`DataResult`] is the recoverable-error sum threaded through every codec
//! and every [`Dynamic`](crate::dynamic::Dynamic) reader.

use crate::error::Error;

/// The outcome of a fallible data operation: a success, or an error carrying
/// a human-readable message and an optional partial result.
///
/// A partial result is the best value the operation could produce despite the
/// error; combinators keep it flowing so callers can choose to recover with
/// [`DataResult::result_or_partial`] or [`DataResult::promote_partial`].
///
/// Construction and the monadic combinators never panic; panicking is
/// reserved for [`DataResult::result_or_partial`] on an error without a
/// partial.
#[must_use]
#[derive(Clone, PartialEq, Debug)]
pub enum DataResult<A> {
    /// The operation succeeded.
    Success(A),
    /// The operation failed, possibly with a partial result.
    Error(DataError<A>),
}

/// The error half of a [`DataResult`].
#[derive(Clone, PartialEq, Debug)]
pub struct DataError<A> {
    message: String,
    partial: Option<A>,
}

impl<A> DataError<A> {
    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The partial result, if one was salvaged.
    pub fn partial(&self) -> Option<&A> {
        self.partial.as_ref()
    }
}

impl<A> DataResult<A> {
    /// A successful result.
    pub fn success(value: A) -> Self {
        Self::Success(value)
    }

    /// An error without a partial result.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(DataError {
            message: message.into(),
            partial: None,
        })
    }

    /// An error carrying a partial result.
    pub fn error_with_partial(message: impl Into<String>, partial: A) -> Self {
        Self::Error(DataError {
            message: message.into(),
            partial: Some(partial),
        })
    }

    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether this is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The error message, if this is an error.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error(error) => Some(&error.message),
        }
    }

    /// Maps the success value. On an error, the partial (if any) is mapped
    /// and the message is kept.
    pub fn map<B>(self, f: impl FnOnce(A) -> B) -> DataResult<B> {
        match self {
            Self::Success(value) => DataResult::Success(f(value)),
            Self::Error(error) => DataResult::Error(DataError {
                message: error.message,
                partial: error.partial.map(f),
            }),
        }
    }

    /// Monadic bind.
    ///
    /// On an error with a partial, the continuation runs on the partial: a
    /// successful continuation keeps the original message with the new value
    /// as partial; a failing continuation concatenates both messages and
    /// keeps the deeper partial when one is available.
    pub fn and_then<B>(self, f: impl FnOnce(A) -> DataResult<B>) -> DataResult<B> {
        match self {
            Self::Success(value) => f(value),
            Self::Error(error) => match error.partial {
                None => DataResult::Error(DataError {
                    message: error.message,
                    partial: None,
                }),
                Some(partial) => match f(partial) {
                    DataResult::Success(value) => DataResult::Error(DataError {
                        message: error.message,
                        partial: Some(value),
                    }),
                    DataResult::Error(inner) => DataResult::Error(DataError {
                        message: format!("{}; {}", error.message, inner.message),
                        partial: inner.partial,
                    }),
                },
            },
        }
    }

    /// Rewrites the error message. Successes are unchanged.
    pub fn map_err(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::Success(value) => Self::Success(value),
            Self::Error(error) => Self::Error(DataError {
                message: f(error.message),
                partial: error.partial,
            }),
        }
    }

    /// Returns the success value, or `default` on error.
    pub fn unwrap_or(self, default: A) -> A {
        match self {
            Self::Success(value) => value,
            Self::Error(_) => default,
        }
    }

    /// Returns the success value, or computes one on error.
    pub fn unwrap_or_else(self, f: impl FnOnce() -> A) -> A {
        match self {
            Self::Success(value) => value,
            Self::Error(_) => f(),
        }
    }

    /// Returns the success value, or an error built from the message.
    ///
    /// # Errors
    /// If this is an error, with the caller's chosen error type.
    pub fn unwrap_or_err<E>(self, f: impl FnOnce(&str) -> E) -> Result<A, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(error) => Err(f(&error.message)),
        }
    }

    /// Returns the success value. On an error with a partial, reports the
    /// message to `on_error` and returns the partial.
    ///
    /// # Panics
    /// On an error without a partial; that is a programming error, not a
    /// data error.
    pub fn result_or_partial(self, on_error: impl FnOnce(&str)) -> A {
        match self {
            Self::Success(value) => value,
            Self::Error(error) => {
                on_error(&error.message);
                error
                    .partial
                    .expect("result_or_partial called on an error without a partial")
            }
        }
    }

    /// Promotes an error-with-partial to a success after reporting the
    /// message to `on_error`. Errors without a partial are returned as-is.
    pub fn promote_partial(self, on_error: impl FnOnce(&str)) -> Self {
        match self {
            Self::Success(value) => Self::Success(value),
            Self::Error(error) => match error.partial {
                Some(partial) => {
                    on_error(&error.message);
                    Self::Success(partial)
                }
                None => Self::Error(DataError {
                    message: error.message,
                    partial: None,
                }),
            },
        }
    }

    /// Combines two results with a binary operation.
    ///
    /// Partials propagate symmetrically: the combined value is produced
    /// whenever both sides have one, and error messages are concatenated
    /// when both sides failed.
    pub fn apply2<B, C>(self, other: DataResult<B>, f: impl FnOnce(A, B) -> C) -> DataResult<C> {
        match (self, other) {
            (Self::Success(a), DataResult::Success(b)) => DataResult::Success(f(a, b)),
            (Self::Success(a), DataResult::Error(eb)) => DataResult::Error(DataError {
                message: eb.message,
                partial: eb.partial.map(|b| f(a, b)),
            }),
            (Self::Error(ea), DataResult::Success(b)) => DataResult::Error(DataError {
                message: ea.message,
                partial: ea.partial.map(|a| f(a, b)),
            }),
            (Self::Error(ea), DataResult::Error(eb)) => DataResult::Error(DataError {
                message: format!("{}; {}", ea.message, eb.message),
                partial: ea.partial.zip(eb.partial).map(|(a, b)| f(a, b)),
            }),
        }
    }

    /// Converts to a plain [`Result`], dropping any partial.
    ///
    /// # Errors
    /// If this is an error, with its message.
    pub fn into_result(self) -> Result<A, Error> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(error) => Err(Error::Data(error.message)),
        }
    }

    /// The success value, if any. Partials are dropped.
    pub fn ok(self) -> Option<A> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::DataResult;

    fn double(value: i64) -> DataResult<i64> {
        DataResult::success(value * 2)
    }

    fn reject(value: i64) -> DataResult<i64> {
        DataResult::error_with_partial("rejected", value)
    }

    #[quickcheck]
    fn left_identity(value: i64) -> bool {
        DataResult::success(value).and_then(double) == double(value)
    }

    #[quickcheck]
    fn right_identity(value: i64) -> bool {
        let result = DataResult::success(value);
        result.clone().and_then(DataResult::success) == result
    }

    #[quickcheck]
    fn associativity(value: i64) -> bool {
        let chained = DataResult::success(value)
            .and_then(double)
            .and_then(reject);
        let nested =
            DataResult::success(value).and_then(|v| double(v).and_then(reject));
        chained == nested
    }

    #[test]
    fn and_then_concatenates_messages_and_keeps_deeper_partial() {
        let result: DataResult<i64> =
            DataResult::error_with_partial("outer", 3).and_then(reject);
        assert_eq!(result, DataResult::error_with_partial("outer; rejected", 3));
    }

    #[test]
    fn and_then_on_bare_error_is_a_projection() {
        let result: DataResult<i64> = DataResult::<i64>::error("bare").and_then(double);
        assert_eq!(result, DataResult::error("bare"));
    }

    #[test]
    fn map_reaches_the_partial() {
        let result = DataResult::error_with_partial("oops", 10).map(|v: i64| v + 1);
        assert_eq!(result, DataResult::error_with_partial("oops", 11));
    }

    #[test]
    fn apply2_combines_partials() {
        let left = DataResult::error_with_partial("left", 2);
        let right = DataResult::error_with_partial("right", 3);
        let combined = left.apply2(right, |a: i64, b: i64| a * b);
        assert_eq!(combined, DataResult::error_with_partial("left; right", 6));
    }

    #[test]
    fn promote_partial_reports_and_succeeds() {
        let mut seen = None;
        let result =
            DataResult::error_with_partial("late", 7).promote_partial(|msg| seen = Some(msg.to_owned()));
        assert_eq!(result, DataResult::success(7));
        assert_eq!(seen.as_deref(), Some("late"));
    }

    #[test]
    fn into_result_drops_partials() {
        let result = DataResult::error_with_partial("gone", 1).into_result();
        assert!(result.is_err());
    }
}
