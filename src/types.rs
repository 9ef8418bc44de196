//! Structural descriptions of data shapes.
//!
//! A [`DataType`] describes the shape a value is expected to have; a
//! [`Typed`] is a [`Dynamic`] that has been checked against one. Shapes are
//! declared as [`TypeTemplate`]s and instantiated inside a [`TypeFamily`],
//! which is how recursive shapes tie the knot.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        OnceLock,
    },
};

use crate::{
    dynamic::Dynamic,
    ops::{
        DynamicOps,
        Number,
    },
    result::DataResult,
};

/// A structural shape.
#[derive(Clone, PartialEq, Debug)]
pub enum DataType {
    /// A boolean.
    Bool,
    /// An integral number.
    Int,
    /// Any number.
    Float,
    /// A string.
    String,
    /// A homogeneous list.
    List(Arc<DataType>),
    /// A value that may be absent (the empty sentinel).
    Optional(Arc<DataType>),
    /// A product of named fields. Extra entries are tolerated; declared
    /// fields must be present and conform.
    Record(Arc<[(String, DataType)]>),
    /// A sum: the value must conform to one of the named variants.
    Sum(Arc<[(String, DataType)]>),
    /// Matches any value.
    Passthrough,
    /// A recursion point resolved through a [`TypeFamily`].
    Recursive(RecursionPoint),
}

impl DataType {
    /// A list of `element`.
    pub fn list(element: DataType) -> Self {
        Self::List(Arc::new(element))
    }

    /// An optional `inner`.
    pub fn optional(inner: DataType) -> Self {
        Self::Optional(Arc::new(inner))
    }

    /// A record of named fields.
    pub fn record(fields: impl IntoIterator<Item = (impl Into<String>, DataType)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// A sum of named variants.
    pub fn sum(variants: impl IntoIterator<Item = (impl Into<String>, DataType)>) -> Self {
        Self::Sum(
            variants
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// Whether a dynamic conforms to this shape.
    pub fn matches<O: DynamicOps>(&self, value: &Dynamic<O>) -> bool {
        match self {
            Self::Bool => value.is_bool(),
            Self::Int => matches!(value.as_number().ok(), Some(Number::Int(_))),
            Self::Float => value.is_number(),
            Self::String => value.is_string(),
            Self::List(element) => match value.as_list().ok() {
                Some(items) => items.iter().all(|item| element.matches(item)),
                None => false,
            },
            Self::Optional(inner) => value.is_null() || inner.matches(value),
            Self::Record(fields) => {
                value.is_map()
                    && fields.iter().all(|(name, ty)| {
                        value
                            .get(name)
                            .ok()
                            .is_some_and(|field| ty.matches(&field))
                    })
            }
            Self::Sum(variants) => variants.iter().any(|(_, ty)| ty.matches(value)),
            Self::Passthrough => true,
            Self::Recursive(point) => point.get().matches(value),
        }
    }

    /// Checks a dynamic against this shape.
    ///
    /// # Errors
    /// If the dynamic does not conform.
    pub fn read<O: DynamicOps>(&self, value: &Dynamic<O>) -> DataResult<Typed<O>> {
        if self.matches(value) {
            DataResult::success(Typed {
                dtype: self.clone(),
                value: value.clone(),
            })
        } else {
            DataResult::error(format!("Not a {self}: {:?}", value.value()))
        }
    }

    /// The shape a child at a named field is expected to have.
    ///
    /// Derivable only for records; everything else yields
    /// [`DataType::Passthrough`].
    pub(crate) fn field_type(&self, name: &str) -> DataType {
        match self {
            Self::Record(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, ty)| ty.clone())
                .unwrap_or(Self::Passthrough),
            Self::Recursive(point) => point.get().field_type(name),
            _ => Self::Passthrough,
        }
    }

    /// The shape a list element is expected to have.
    pub(crate) fn element_type(&self) -> DataType {
        match self {
            Self::List(element) => (**element).clone(),
            Self::Recursive(point) => point.get().element_type(),
            _ => Self::Passthrough,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("boolean"),
            Self::Int => f.write_str("integer"),
            Self::Float => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::List(element) => write!(f, "list of {element}"),
            Self::Optional(inner) => write!(f, "optional {inner}"),
            Self::Record(_) => f.write_str("record"),
            Self::Sum(_) => f.write_str("sum"),
            Self::Passthrough => f.write_str("value"),
            Self::Recursive(_) => f.write_str("recursive"),
        }
    }
}

/// A self-reference inside a recursive shape.
///
/// The slot is filled when the owning [`TypeFamily`] finishes instantiating
/// the shape; accessing it before then is a construction-order bug and fails
/// fast.
#[derive(Clone)]
pub struct RecursionPoint(Arc<OnceLock<DataType>>);

impl RecursionPoint {
    pub(crate) fn unresolved() -> Self {
        Self(Arc::new(OnceLock::new()))
    }

    pub(crate) fn fill(&self, dtype: DataType) {
        self.0
            .set(dtype)
            .ok()
            .expect("Recursion point resolved twice");
    }

    /// The resolved shape.
    ///
    /// # Panics
    /// If the recursive type is accessed during construction.
    pub fn get(&self) -> &DataType {
        self.0
            .get()
            .expect("Recursive type accessed during construction")
    }
}

impl PartialEq for RecursionPoint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RecursionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecursionPoint(..)")
    }
}

/// A shape declaration, instantiated inside a [`TypeFamily`].
///
/// [`TypeTemplate::Recurse`] refers to a family member by index; index `0`
/// inside a member's own template refers to the member currently being
/// defined, which is how recursive shapes are declared.
#[derive(Clone, PartialEq, Debug)]
pub enum TypeTemplate {
    /// A boolean.
    Bool,
    /// An integral number.
    Int,
    /// Any number.
    Float,
    /// A string.
    String,
    /// A homogeneous list.
    List(Box<TypeTemplate>),
    /// A value that may be absent.
    Optional(Box<TypeTemplate>),
    /// A product of named fields.
    Record(Vec<(String, TypeTemplate)>),
    /// A sum of named variants.
    Sum(Vec<(String, TypeTemplate)>),
    /// Matches any value.
    Passthrough,
    /// A reference to a family member by index.
    Recurse(usize),
}

impl TypeTemplate {
    /// A record of named fields.
    pub fn record(fields: impl IntoIterator<Item = (impl Into<String>, TypeTemplate)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
        )
    }

    /// A list of `element`.
    pub fn list(element: TypeTemplate) -> Self {
        Self::List(Box::new(element))
    }

    /// Instantiates this template as a standalone shape; `Recurse(0)` refers
    /// to the shape itself.
    pub fn instantiate(&self) -> DataType {
        TypeFamily::new(vec![self.clone()]).resolve(0)
    }
}

/// An indexed set of shape declarations that may reference each other.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeFamily {
    templates: Vec<TypeTemplate>,
}

impl TypeFamily {
    /// Creates a family from member templates.
    pub fn new(templates: Vec<TypeTemplate>) -> Self {
        Self { templates }
    }

    /// The number of members.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the family has no members.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Instantiates the member at `index`.
    ///
    /// # Panics
    /// If `index` (or any index it references) is out of range.
    pub fn resolve(&self, index: usize) -> DataType {
        let mut in_progress = HashMap::new();
        self.resolve_member(index, &mut in_progress)
    }

    fn resolve_member(
        &self,
        index: usize,
        in_progress: &mut HashMap<usize, RecursionPoint>,
    ) -> DataType {
        assert!(
            index < self.templates.len(),
            "Type family index {index} out of range"
        );

        let point = RecursionPoint::unresolved();
        in_progress.insert(index, point.clone());
        let resolved = self.instantiate(index, &self.templates[index], in_progress);
        point.fill(resolved.clone());
        in_progress.remove(&index);
        resolved
    }

    fn instantiate(
        &self,
        current: usize,
        template: &TypeTemplate,
        in_progress: &mut HashMap<usize, RecursionPoint>,
    ) -> DataType {
        match template {
            TypeTemplate::Bool => DataType::Bool,
            TypeTemplate::Int => DataType::Int,
            TypeTemplate::Float => DataType::Float,
            TypeTemplate::String => DataType::String,
            TypeTemplate::List(element) => {
                DataType::list(self.instantiate(current, element, in_progress))
            }
            TypeTemplate::Optional(inner) => {
                DataType::optional(self.instantiate(current, inner, in_progress))
            }
            TypeTemplate::Record(fields) => DataType::Record(
                fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), self.instantiate(current, ty, in_progress)))
                    .collect(),
            ),
            TypeTemplate::Sum(variants) => DataType::Sum(
                variants
                    .iter()
                    .map(|(name, ty)| (name.clone(), self.instantiate(current, ty, in_progress)))
                    .collect(),
            ),
            TypeTemplate::Passthrough => DataType::Passthrough,
            TypeTemplate::Recurse(index) => {
                // Index 0 refers to the member currently being defined.
                let target = if *index == 0 { current } else { *index };
                match in_progress.get(&target) {
                    Some(point) => DataType::Recursive(point.clone()),
                    None => self.resolve_member(target, in_progress),
                }
            }
        }
    }
}

/// A dynamic paired with the shape it was checked against.
#[derive(Clone, PartialEq, Debug)]
pub struct Typed<O: DynamicOps> {
    dtype: DataType,
    value: Dynamic<O>,
}

impl<O: DynamicOps> Typed<O> {
    /// Checks a dynamic against a shape.
    ///
    /// # Errors
    /// If the dynamic does not conform.
    pub fn new(dtype: &DataType, value: &Dynamic<O>) -> DataResult<Self> {
        dtype.read(value)
    }

    pub(crate) fn unchecked(dtype: DataType, value: Dynamic<O>) -> Self {
        Self { dtype, value }
    }

    /// The shape this value was checked against.
    pub fn data_type(&self) -> &DataType {
        &self.dtype
    }

    /// Encodes back into a plain dynamic.
    pub fn encode(&self) -> Dynamic<O> {
        self.value.clone()
    }

    /// Unwraps into the plain dynamic.
    pub fn into_dynamic(self) -> Dynamic<O> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        DataType,
        TypeFamily,
        TypeTemplate,
    };
    use crate::{
        backend::json::JsonOps,
        dynamic::Dynamic,
    };

    fn dynamic(value: serde_json::Value) -> Dynamic<JsonOps> {
        Dynamic::new(JsonOps, value)
    }

    #[test]
    fn record_matching_tolerates_extra_fields() {
        let ty = DataType::record([("name", DataType::String), ("level", DataType::Int)]);

        assert!(ty.matches(&dynamic(json!({ "name": "Alice", "level": 10, "extra": true }))));
        assert!(!ty.matches(&dynamic(json!({ "name": "Alice" }))));
        assert!(!ty.matches(&dynamic(json!({ "name": "Alice", "level": "ten" }))));
    }

    #[test]
    fn read_reports_the_expected_kind() {
        let result = DataType::String.read(&dynamic(json!(42)));
        let message = result.error_message().expect("should not conform");
        assert!(message.starts_with("Not a string:"), "{message}");
    }

    #[test]
    fn recursive_template_resolves_through_the_family() {
        // A cons-list: { head: int, tail: optional <self> }.
        let family = TypeFamily::new(vec![TypeTemplate::record([
            ("head".to_owned(), TypeTemplate::Int),
            (
                "tail".to_owned(),
                TypeTemplate::Optional(Box::new(TypeTemplate::Recurse(0))),
            ),
        ])]);

        let ty = family.resolve(0);
        assert!(ty.matches(&dynamic(json!({
            "head": 1,
            "tail": { "head": 2, "tail": null }
        }))));
        assert!(!ty.matches(&dynamic(json!({
            "head": 1,
            "tail": { "head": "two", "tail": null }
        }))));
    }

    #[test]
    fn family_members_reference_each_other() {
        let family = TypeFamily::new(vec![
            TypeTemplate::record([("items".to_owned(), TypeTemplate::list(TypeTemplate::Recurse(1)))]),
            TypeTemplate::record([("id".to_owned(), TypeTemplate::Int)]),
        ]);

        let ty = family.resolve(0);
        assert!(ty.matches(&dynamic(json!({ "items": [{ "id": 1 }, { "id": 2 }] }))));
        assert!(!ty.matches(&dynamic(json!({ "items": [{ "id": "a" }] }))));
    }

    #[test]
    #[should_panic(expected = "accessed during construction")]
    fn unresolved_recursion_point_fails_fast() {
        let point = super::RecursionPoint::unresolved();
        let _ = point.get();
    }
}
