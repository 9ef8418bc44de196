//! The batched field transformer.
//!
//! [`batch`] accumulates an ordered sequence of field operations and fuses
//! them into one rule that executes in a single encode/decode cycle: a
//! migration composed of `k` field edits allocates one carrier re-check
//! instead of `k`. Each operation delegates to the same transform bodies as
//! the standalone rules, so a batch is observably equivalent to the
//! [`seq_all`](crate::rules::seq_all) of the rules it fuses.

use std::sync::Arc;

use crate::{
    dynamic::Dynamic,
    ops::DynamicOps,
    optics::finder::Finder,
    rules::{
        BoxedRule,
        Transformed,
        dynamic_rule,
        fields::{
            self,
            FieldValue,
        },
        path,
    },
};

type TransformFn<O> = Arc<dyn Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync>;

enum BatchStep<O: DynamicOps> {
    Rename(String, String),
    Remove(String),
    Add(String, Dynamic<O>),
    Set(String, Dynamic<O>),
    Transform(String, TransformFn<O>),
    TransformAt(Arc<Finder>, TransformFn<O>),
    RenameAt(Arc<Finder>, String),
    RemoveAt(Arc<Finder>),
    AddAt(Arc<Finder>, Dynamic<O>),
    Move(Arc<Finder>, Arc<Finder>),
    Copy(Arc<Finder>, Arc<Finder>),
    Group(String, Vec<String>),
    Flatten(String),
    WhenExists(String, TransformFn<O>),
    WhenMissing(String, TransformFn<O>),
    WhenEquals(String, FieldValue, TransformFn<O>),
}

impl<O: DynamicOps> BatchStep<O> {
    fn apply(&self, value: &Dynamic<O>) -> Transformed<O> {
        match self {
            Self::Rename(old, new) => fields::rename_entry(value, old, new),
            Self::Remove(name) => fields::remove_entry(value, name),
            Self::Add(name, field) => fields::add_entry(value, name, field),
            Self::Set(name, field) => fields::set_entry(value, name, field),
            Self::Transform(name, f) => fields::transform_entry(value, name, f.as_ref()),
            Self::TransformAt(finder, f) => fields::transform_at(value, finder, f.as_ref()),
            Self::RenameAt(finder, new_name) => fields::rename_at(value, finder, new_name),
            Self::RemoveAt(finder) => fields::remove_at(value, finder),
            Self::AddAt(finder, field) => fields::add_at(value, finder, field),
            Self::Move(source, target) => fields::move_entry(value, source, target),
            Self::Copy(source, target) => fields::copy_entry(value, source, target),
            Self::Group(target, sources) => fields::group_entries(value, target, sources),
            Self::Flatten(name) => fields::flatten_entry(value, name),
            Self::WhenExists(name, f) => {
                fields::conditional(value, value.has(name), f.as_ref())
            }
            Self::WhenMissing(name, f) => {
                fields::conditional(value, value.is_map() && !value.has(name), f.as_ref())
            }
            Self::WhenEquals(name, expected, f) => {
                let holds = value
                    .get(name)
                    .ok()
                    .is_some_and(|field| expected.matches(&field));
                fields::conditional(value, holds, f.as_ref())
            }
        }
    }
}

/// Accumulates batched field operations. Operations are strictly ordered;
/// later operations see the result of earlier ones.
pub struct BatchBuilder<O: DynamicOps> {
    ops: O,
    steps: Vec<BatchStep<O>>,
}

impl<O: DynamicOps> BatchBuilder<O> {
    fn new(ops: O) -> Self {
        Self {
            ops,
            steps: Vec::new(),
        }
    }

    fn push(mut self, step: BatchStep<O>) -> Self {
        self.steps.push(step);
        self
    }

    fn parse(path: &str) -> Arc<Finder> {
        path::parse(path).expect("Invalid path")
    }

    /// Renames a field, keeping its position.
    pub fn rename(self, old: &str, new: &str) -> Self {
        self.push(BatchStep::Rename(old.to_owned(), new.to_owned()))
    }

    /// Removes a field if present.
    pub fn remove(self, name: &str) -> Self {
        self.push(BatchStep::Remove(name.to_owned()))
    }

    /// Adds a field with a default value, only if it is missing.
    pub fn add(self, name: &str, default: O::Value) -> Self {
        let default = Dynamic::new(self.ops, default);
        self.push(BatchStep::Add(name.to_owned(), default))
    }

    /// Sets a field unconditionally.
    pub fn set(self, name: &str, value: O::Value) -> Self {
        let value = Dynamic::new(self.ops, value);
        self.push(BatchStep::Set(name.to_owned(), value))
    }

    /// Applies `f` to a field's value; skipped if the field is missing.
    pub fn transform(
        self,
        name: &str,
        f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
    ) -> Self {
        self.push(BatchStep::Transform(name.to_owned(), Arc::new(f)))
    }

    /// Applies `f` to the value at a dot path.
    ///
    /// # Panics
    /// If the path is invalid.
    pub fn transform_at(
        self,
        field_path: &str,
        f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
    ) -> Self {
        let finder = Self::parse(field_path);
        self.push(BatchStep::TransformAt(finder, Arc::new(f)))
    }

    /// Renames the field at a dot path.
    ///
    /// # Panics
    /// If the path is invalid.
    pub fn rename_at(self, field_path: &str, new_name: &str) -> Self {
        let finder = Self::parse(field_path);
        self.push(BatchStep::RenameAt(finder, new_name.to_owned()))
    }

    /// Removes the field at a dot path.
    ///
    /// # Panics
    /// If the path is invalid.
    pub fn remove_at(self, field_path: &str) -> Self {
        let finder = Self::parse(field_path);
        self.push(BatchStep::RemoveAt(finder))
    }

    /// Adds a field at a dot path, only if it is missing.
    ///
    /// # Panics
    /// If the path is invalid.
    pub fn add_at(self, field_path: &str, default: O::Value) -> Self {
        let finder = Self::parse(field_path);
        let default = Dynamic::new(self.ops, default);
        self.push(BatchStep::AddAt(finder, default))
    }

    /// Moves the value at `source` to `target`.
    ///
    /// # Panics
    /// If either path is invalid.
    pub fn move_field(self, source: &str, target: &str) -> Self {
        let source = Self::parse(source);
        let target = Self::parse(target);
        self.push(BatchStep::Move(source, target))
    }

    /// Copies the value at `source` to `target`.
    ///
    /// # Panics
    /// If either path is invalid.
    pub fn copy_field(self, source: &str, target: &str) -> Self {
        let source = Self::parse(source);
        let target = Self::parse(target);
        self.push(BatchStep::Copy(source, target))
    }

    /// Groups the source fields as a new map under `target`.
    pub fn group(self, target: &str, sources: &[&str]) -> Self {
        let sources = sources.iter().map(|&source| source.to_owned()).collect();
        self.push(BatchStep::Group(target.to_owned(), sources))
    }

    /// Moves every entry of `root[name]` back to the root.
    pub fn flatten(self, name: &str) -> Self {
        self.push(BatchStep::Flatten(name.to_owned()))
    }

    /// Runs `transform` when the field exists.
    pub fn when_exists(
        self,
        name: &str,
        transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
    ) -> Self {
        self.push(BatchStep::WhenExists(name.to_owned(), Arc::new(transform)))
    }

    /// Runs `transform` when the field is missing.
    pub fn when_missing(
        self,
        name: &str,
        transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
    ) -> Self {
        self.push(BatchStep::WhenMissing(name.to_owned(), Arc::new(transform)))
    }

    /// Runs `transform` when the field equals `value`.
    pub fn when_equals(
        self,
        name: &str,
        value: impl Into<FieldValue>,
        transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
    ) -> Self {
        self.push(BatchStep::WhenEquals(
            name.to_owned(),
            value.into(),
            Arc::new(transform),
        ))
    }
}

/// Fuses the operations accumulated by `build` into one rule executing in a
/// single encode/decode cycle.
pub fn batch<O: DynamicOps>(
    ops: O,
    build: impl FnOnce(BatchBuilder<O>) -> BatchBuilder<O>,
) -> BoxedRule<O> {
    let steps = build(BatchBuilder::new(ops)).steps;
    dynamic_rule("batch", move |value| {
        let mut current = value.clone();
        let mut changed = false;
        for step in &steps {
            if let Transformed::Changed(next) = step.apply(&current) {
                current = next;
                changed = true;
            }
        }
        if changed {
            Transformed::Changed(current)
        } else {
            Transformed::Unchanged
        }
    })
}
