//! [`Schema`] binds type references to shape declarations at one version;
//! [`SchemaRegistry`] resolves any version to its governing schema.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::{
    types::{
        DataType,
        TypeTemplate,
    },
    version::{
        DataVersion,
        TypeReference,
    },
};

/// The set of shape declarations in force at one [`DataVersion`].
///
/// Built through [`Schema::builder`]; immutable once built.
#[derive(Clone, PartialEq, Debug)]
pub struct Schema {
    version: DataVersion,
    bindings: IndexMap<TypeReference, TypeTemplate>,
}

impl Schema {
    /// Starts building a schema for a version.
    pub fn builder(version: DataVersion) -> SchemaBuilder {
        SchemaBuilder {
            version,
            bindings: IndexMap::new(),
        }
    }

    /// The version this schema describes.
    pub fn version(&self) -> DataVersion {
        self.version
    }

    /// The declared template for a reference.
    pub fn template(&self, reference: &TypeReference) -> Option<&TypeTemplate> {
        self.bindings.get(reference)
    }

    /// Instantiates the declared shape for a reference.
    pub fn resolve(&self, reference: &TypeReference) -> Option<DataType> {
        self.bindings
            .get(reference)
            .map(TypeTemplate::instantiate)
    }

    /// The declared references, in declaration order.
    pub fn references(&self) -> impl Iterator<Item = &TypeReference> {
        self.bindings.keys()
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    version: DataVersion,
    bindings: IndexMap<TypeReference, TypeTemplate>,
}

impl SchemaBuilder {
    /// Declares the shape of a reference at this version.
    pub fn with_type(mut self, reference: TypeReference, template: TypeTemplate) -> Self {
        self.bindings.insert(reference, template);
        self
    }

    /// Publishes the schema.
    pub fn build(self) -> Schema {
        Schema {
            version: self.version,
            bindings: self.bindings,
        }
    }
}

/// Schemas keyed by version.
///
/// Lookup for an arbitrary version returns the latest schema whose version
/// is less than or equal to the request.
#[derive(Clone, Default, Debug)]
pub struct SchemaRegistry {
    schemas: BTreeMap<DataVersion, Schema>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fully built schema, replacing any schema already
    /// registered at the same version.
    pub fn register(&mut self, schema: Schema) {
        self.schemas.insert(schema.version(), schema);
    }

    /// The schema governing `version`: the latest schema registered at or
    /// before it.
    pub fn schema_for(&self, version: DataVersion) -> Option<&Schema> {
        self.schemas
            .range(..=version)
            .next_back()
            .map(|(_, schema)| schema)
    }

    /// The schema registered at exactly `version`.
    pub fn schema_at(&self, version: DataVersion) -> Option<&Schema> {
        self.schemas.get(&version)
    }

    /// The most recent schema.
    pub fn latest(&self) -> Option<&Schema> {
        self.schemas.values().next_back()
    }

    /// Registered schemas in ascending version order.
    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Schema,
        SchemaRegistry,
    };
    use crate::{
        types::TypeTemplate,
        version::{
            DataVersion,
            TypeReference,
        },
    };

    fn schema(version: u32) -> Schema {
        Schema::builder(DataVersion::new(version))
            .with_type(
                TypeReference::new("player"),
                TypeTemplate::record([("name".to_owned(), TypeTemplate::String)]),
            )
            .build()
    }

    #[test]
    fn lookup_returns_the_floor_schema() {
        let mut registry = SchemaRegistry::new();
        registry.register(schema(1));
        registry.register(schema(3));

        assert_eq!(
            registry.schema_for(DataVersion::new(2)).map(Schema::version),
            Some(DataVersion::new(1))
        );
        assert_eq!(
            registry.schema_for(DataVersion::new(3)).map(Schema::version),
            Some(DataVersion::new(3))
        );
        assert_eq!(
            registry.schema_for(DataVersion::new(9)).map(Schema::version),
            Some(DataVersion::new(3))
        );
        assert!(registry.schema_for(DataVersion::new(0)).is_none());
    }

    #[test]
    fn resolve_instantiates_the_declared_shape() {
        let schema = schema(1);
        let player = TypeReference::new("player");

        assert!(schema.resolve(&player).is_some());
        assert!(schema.resolve(&TypeReference::new("world")).is_none());
    }
}
