use thiserror::Error;

use crate::version::DataVersion;

/// An error that may occur when building or driving a migration.
///
/// Recoverable data errors (missing fields, type mismatches, values out of
/// range) are carried by [`DataResult`](crate::result::DataResult) instead;
/// this type covers misuse of the fixer itself.
#[derive(Error, Debug)]
pub enum Error {
    /// A migration was requested from a newer version to an older one.
    #[error("cannot downgrade from version {from} to {to}")]
    Downgrade {
        /// The version the data was written at.
        from: DataVersion,
        /// The version the caller asked for.
        to: DataVersion,
    },

    /// A dot-notation path failed to parse.
    #[error("invalid path {path:?}: {reason}")]
    Path {
        /// The raw path string.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A recoverable data error escalated out of a
    /// [`DataResult`](crate::result::DataResult).
    #[error("data error: {0}")]
    Data(String),

    /// Custom error.
    #[error("custom error: {0}")]
    Custom(String),
}

impl Error {
    /// Custom error.
    pub fn custom(error: impl std::fmt::Display) -> Self {
        Self::Custom(format!("{error}"))
    }
}
