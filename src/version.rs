//! [`DataVersion`] tags persisted data; [`TypeReference`] names a logical
//! data kind.

use std::{
    fmt,
    sync::Arc,
};

use serde::Serialize;

/// A non-negative integer version tag with a natural order.
///
/// Migrations always move from a lower version to a higher one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize)]
pub struct DataVersion(u32);

impl DataVersion {
    /// Creates a version tag.
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// The raw version number.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl From<u32> for DataVersion {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for DataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An interned, case-sensitive identifier naming a logical data kind, such as
/// `"player"` or `"world"`.
///
/// Two references are equal iff their strings are equal. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeReference(Arc<str>);

impl TypeReference {
    /// Creates a reference from a name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The referenced name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeReference {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TypeReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
