//! Field-level rewrite rules: rename, remove, add, set, transform, their
//! dot-path variants, grouping, and conditionals.
//!
//! Every rule here is a single encode/decode cycle, and every rule is total
//! over its input: a missing field makes the rule a recorded no-op, not a
//! failure. Dot paths follow the syntax of [`path::parse`](super::path::parse).

use std::sync::Arc;

use crate::{
    dynamic::Dynamic,
    ops::{
        DynamicOps,
        Number,
    },
    optics::finder::{
        Finder,
        FinderStep,
    },
    rules::{
        BoxedRule,
        Transformed,
        dynamic_rule,
        path,
    },
};

/// A concrete value to compare a field against.
///
/// Comparison reads the field as the same nominal kind and yields `false` on
/// a kind mismatch; it never raises.
#[derive(Clone, PartialEq, Debug)]
pub enum FieldValue {
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
}

impl FieldValue {
    pub(crate) fn matches<O: DynamicOps>(&self, field: &Dynamic<O>) -> bool {
        match self {
            Self::Bool(expected) => field.as_boolean().ok() == Some(*expected),
            Self::Number(expected) => field.as_number().ok() == Some(*expected),
            Self::String(expected) => field.as_string().ok().as_deref() == Some(expected),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(Number::Int(i64::from(value)))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(Number::Int(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<Number> for FieldValue {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

// Shared transform bodies. The rule constructors below and the batch
// builder both delegate here, which is what makes a batch observably
// equivalent to the sequential rules it fuses.

pub(crate) fn rename_entry<O: DynamicOps>(
    value: &Dynamic<O>,
    old: &str,
    new: &str,
) -> Transformed<O> {
    if !value.has(old) {
        return Transformed::Unchanged;
    }
    let Some(entries) = value.as_map().ok() else {
        return Transformed::Unchanged;
    };
    // Rebuild so the renamed entry keeps its position.
    let rebuilt = value.create_map(entries.into_iter().map(|(key, field)| {
        if key.as_string().ok().as_deref() == Some(old) {
            (key.create_string(new), field)
        } else {
            (key, field)
        }
    }));
    Transformed::Changed(rebuilt)
}

pub(crate) fn remove_entry<O: DynamicOps>(value: &Dynamic<O>, name: &str) -> Transformed<O> {
    if value.has(name) {
        Transformed::Changed(value.remove(name))
    } else {
        Transformed::Unchanged
    }
}

pub(crate) fn add_entry<O: DynamicOps>(
    value: &Dynamic<O>,
    name: &str,
    field: &Dynamic<O>,
) -> Transformed<O> {
    if !value.is_map() || value.has(name) {
        Transformed::Unchanged
    } else {
        Transformed::Changed(value.set(name, field.clone()))
    }
}

pub(crate) fn set_entry<O: DynamicOps>(
    value: &Dynamic<O>,
    name: &str,
    field: &Dynamic<O>,
) -> Transformed<O> {
    if value.is_map() {
        Transformed::Changed(value.set(name, field.clone()))
    } else {
        Transformed::Unchanged
    }
}

pub(crate) fn transform_entry<O: DynamicOps>(
    value: &Dynamic<O>,
    name: &str,
    f: &(dyn Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync),
) -> Transformed<O> {
    if value.has(name) {
        Transformed::Changed(value.update(name, f))
    } else {
        Transformed::Unchanged
    }
}

pub(crate) fn transform_at<O: DynamicOps>(
    value: &Dynamic<O>,
    finder: &Finder,
    f: &(dyn Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync),
) -> Transformed<O> {
    if finder.find(value).is_some() {
        Transformed::Changed(finder.update(value, f))
    } else {
        Transformed::Unchanged
    }
}

pub(crate) fn add_at<O: DynamicOps>(
    value: &Dynamic<O>,
    finder: &Finder,
    field: &Dynamic<O>,
) -> Transformed<O> {
    if finder.find(value).is_some() {
        Transformed::Unchanged
    } else {
        Transformed::Changed(finder.set_or_create(value, field.clone()))
    }
}

pub(crate) fn remove_at<O: DynamicOps>(value: &Dynamic<O>, finder: &Finder) -> Transformed<O> {
    if finder.find(value).is_some() {
        Transformed::Changed(finder.remove(value))
    } else {
        Transformed::Unchanged
    }
}

pub(crate) fn rename_at<O: DynamicOps>(
    value: &Dynamic<O>,
    finder: &Finder,
    new_name: &str,
) -> Transformed<O> {
    let Some((FinderStep::Field(old), parents)) = finder.steps().split_last() else {
        return Transformed::Unchanged;
    };
    let parent_finder = Finder::from_steps(parents.to_vec());
    let Some(parent) = parent_finder.find(value) else {
        return Transformed::Unchanged;
    };
    match rename_entry(&parent, old, new_name) {
        Transformed::Changed(renamed) => {
            Transformed::Changed(parent_finder.set(value, renamed))
        }
        other => other,
    }
}

pub(crate) fn move_entry<O: DynamicOps>(
    value: &Dynamic<O>,
    source: &Finder,
    target: &Finder,
) -> Transformed<O> {
    match source.find(value) {
        Some(found) => {
            let removed = source.remove(value);
            Transformed::Changed(target.set_or_create(&removed, found))
        }
        None => Transformed::Unchanged,
    }
}

pub(crate) fn copy_entry<O: DynamicOps>(
    value: &Dynamic<O>,
    source: &Finder,
    target: &Finder,
) -> Transformed<O> {
    match source.find(value) {
        Some(found) => Transformed::Changed(target.set_or_create(value, found)),
        None => Transformed::Unchanged,
    }
}

pub(crate) fn group_entries<O: DynamicOps>(
    value: &Dynamic<O>,
    target: &str,
    sources: &[String],
) -> Transformed<O> {
    if !value.is_map() {
        return Transformed::Unchanged;
    }
    let mut grouped = value.empty_map();
    let mut remaining = value.clone();
    for source in sources {
        if let Some(found) = value.get(source).ok() {
            grouped = grouped.set(source, found);
            remaining = remaining.remove(source);
        }
    }
    Transformed::Changed(remaining.set(target, grouped))
}

pub(crate) fn flatten_entry<O: DynamicOps>(value: &Dynamic<O>, name: &str) -> Transformed<O> {
    let Some(group) = value.get(name).ok() else {
        return Transformed::Unchanged;
    };
    let Some(entries) = group.as_map().ok() else {
        return Transformed::Unchanged;
    };
    let mut flattened = value.remove(name);
    for (key, field) in entries {
        if let Some(key) = key.as_string().ok() {
            flattened = flattened.set(&key, field);
        }
    }
    Transformed::Changed(flattened)
}

pub(crate) fn conditional<O: DynamicOps>(
    value: &Dynamic<O>,
    holds: bool,
    f: &(dyn Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync),
) -> Transformed<O> {
    if holds {
        Transformed::Changed(f(value.clone()))
    } else {
        Transformed::Unchanged
    }
}

fn parse(path: &str) -> Arc<Finder> {
    path::parse(path).expect("Invalid path")
}

/// Renames a field if present; a no-op otherwise. The renamed entry keeps
/// its position.
pub fn rename_field<O: DynamicOps>(_ops: O, old: &str, new: &str) -> BoxedRule<O> {
    let (old, new) = (old.to_owned(), new.to_owned());
    dynamic_rule(format!("rename_field({old} -> {new})"), move |value| {
        rename_entry(value, &old, &new)
    })
}

/// Renames several fields at once.
pub fn rename_fields<O: DynamicOps>(
    _ops: O,
    renames: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
) -> BoxedRule<O> {
    let renames: Vec<(String, String)> = renames
        .into_iter()
        .map(|(old, new)| (old.into(), new.into()))
        .collect();
    dynamic_rule("rename_fields", move |value| {
        let mut current = value.clone();
        let mut changed = false;
        for (old, new) in &renames {
            if let Transformed::Changed(next) = rename_entry(&current, old, new) {
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

/// Removes a field if present.
pub fn remove_field<O: DynamicOps>(_ops: O, name: &str) -> BoxedRule<O> {
    let name = name.to_owned();
    dynamic_rule(format!("remove_field({name})"), move |value| {
        remove_entry(value, &name)
    })
}

/// Removes several fields at once.
pub fn remove_fields<O: DynamicOps>(_ops: O, names: &[&str]) -> BoxedRule<O> {
    let names: Vec<String> = names.iter().map(|&name| name.to_owned()).collect();
    dynamic_rule("remove_fields", move |value| {
        let mut current = value.clone();
        let mut changed = false;
        for name in &names {
            if let Transformed::Changed(next) = remove_entry(&current, name) {
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

/// Adds a field with a default value, only if it is missing.
pub fn add_field<O: DynamicOps>(ops: O, name: &str, default: O::Value) -> BoxedRule<O> {
    let name = name.to_owned();
    let default = Dynamic::new(ops, default);
    dynamic_rule(format!("add_field({name})"), move |value| {
        add_entry(value, &name, &default)
    })
}

/// Sets a field unconditionally, overwriting any existing value.
pub fn set_field<O: DynamicOps>(ops: O, name: &str, value: O::Value) -> BoxedRule<O> {
    let name = name.to_owned();
    let field = Dynamic::new(ops, value);
    dynamic_rule(format!("set_field({name})"), move |value| {
        set_entry(value, &name, &field)
    })
}

/// Applies `f` to a field's value; a no-op if the field is missing.
pub fn transform_field<O: DynamicOps>(
    _ops: O,
    name: &str,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    let name = name.to_owned();
    dynamic_rule(format!("transform_field({name})"), move |value| {
        transform_entry(value, &name, &f)
    })
}

/// Rewrites the child located by `finder`; a no-op if the location is
/// missing. `name` labels the rule in logs and diagnostics.
pub fn update_at<O: DynamicOps>(
    name: &str,
    _ops: O,
    finder: Finder,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    dynamic_rule(name.to_owned(), move |value| {
        transform_at(value, &finder, &f)
    })
}

/// Applies `f` to the field at a dot path; a no-op if the path misses.
///
/// # Panics
/// If the path is invalid.
pub fn transform_field_at<O: DynamicOps>(
    _ops: O,
    field_path: &str,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    let finder = parse(field_path);
    dynamic_rule(format!("transform_field_at({field_path})"), move |value| {
        transform_at(value, &finder, &f)
    })
}

/// Renames the field at a dot path, keeping its position.
///
/// # Panics
/// If the path is invalid.
pub fn rename_field_at<O: DynamicOps>(_ops: O, field_path: &str, new_name: &str) -> BoxedRule<O> {
    let finder = parse(field_path);
    let new_name = new_name.to_owned();
    dynamic_rule(
        format!("rename_field_at({field_path} -> {new_name})"),
        move |value| rename_at(value, &finder, &new_name),
    )
}

/// Removes the field at a dot path; a no-op if the path misses.
///
/// # Panics
/// If the path is invalid.
pub fn remove_field_at<O: DynamicOps>(_ops: O, field_path: &str) -> BoxedRule<O> {
    let finder = parse(field_path);
    dynamic_rule(format!("remove_field_at({field_path})"), move |value| {
        remove_at(value, &finder)
    })
}

/// Adds a field at a dot path, only if it is missing. Absent intermediate
/// maps are created.
///
/// # Panics
/// If the path is invalid.
pub fn add_field_at<O: DynamicOps>(ops: O, field_path: &str, default: O::Value) -> BoxedRule<O> {
    let finder = parse(field_path);
    let default = Dynamic::new(ops, default);
    dynamic_rule(format!("add_field_at({field_path})"), move |value| {
        add_at(value, &finder, &default)
    })
}

/// Moves the value at `source` to `target` (remove then set); a no-op if
/// `source` is absent. Absent intermediate maps on the target side are
/// created.
///
/// # Panics
/// If either path is invalid.
pub fn move_field<O: DynamicOps>(_ops: O, source: &str, target: &str) -> BoxedRule<O> {
    let source_finder = parse(source);
    let target_finder = parse(target);
    dynamic_rule(format!("move_field({source} -> {target})"), move |value| {
        move_entry(value, &source_finder, &target_finder)
    })
}

/// Copies the value at `source` to `target`, keeping the source; a no-op if
/// `source` is absent.
///
/// # Panics
/// If either path is invalid.
pub fn copy_field<O: DynamicOps>(_ops: O, source: &str, target: &str) -> BoxedRule<O> {
    let source_finder = parse(source);
    let target_finder = parse(target);
    dynamic_rule(format!("copy_field({source} -> {target})"), move |value| {
        copy_entry(value, &source_finder, &target_finder)
    })
}

/// Removes each source field from the root and groups them as a new map
/// under `target`.
pub fn group_fields<O: DynamicOps>(_ops: O, target: &str, sources: &[&str]) -> BoxedRule<O> {
    let target = target.to_owned();
    let sources: Vec<String> = sources.iter().map(|&source| source.to_owned()).collect();
    dynamic_rule(format!("group_fields({target})"), move |value| {
        group_entries(value, &target, &sources)
    })
}

/// The inverse of [`group_fields`]: moves every entry of `root[name]` back
/// to the root and removes `root[name]`.
pub fn flatten_field<O: DynamicOps>(_ops: O, name: &str) -> BoxedRule<O> {
    let name = name.to_owned();
    dynamic_rule(format!("flatten_field({name})"), move |value| {
        flatten_entry(value, &name)
    })
}

/// Delegates to `rule` only when the field exists; a no-op otherwise.
pub fn if_field_exists<O: DynamicOps>(_ops: O, name: &str, rule: BoxedRule<O>) -> BoxedRule<O> {
    conditional_rule(name, Condition::Exists, rule)
}

/// Delegates to `rule` only when the field is missing; a no-op otherwise.
pub fn if_field_missing<O: DynamicOps>(_ops: O, name: &str, rule: BoxedRule<O>) -> BoxedRule<O> {
    conditional_rule(name, Condition::Missing, rule)
}

/// Delegates to `rule` only when the field equals `value`; a no-op
/// otherwise.
pub fn if_field_equals<O: DynamicOps>(
    _ops: O,
    name: &str,
    value: impl Into<FieldValue>,
    rule: BoxedRule<O>,
) -> BoxedRule<O> {
    conditional_rule(name, Condition::Equals(value.into()), rule)
}

/// Single-cycle conditional: runs `transform` when the field exists.
pub fn when_field_exists<O: DynamicOps>(
    _ops: O,
    name: &str,
    transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    let name = name.to_owned();
    dynamic_rule(format!("when_field_exists({name})"), move |value| {
        conditional(value, value.has(&name), &transform)
    })
}

/// Single-cycle conditional: runs `transform` when the field is missing.
pub fn when_field_missing<O: DynamicOps>(
    _ops: O,
    name: &str,
    transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    let name = name.to_owned();
    dynamic_rule(format!("when_field_missing({name})"), move |value| {
        conditional(value, value.is_map() && !value.has(&name), &transform)
    })
}

/// Single-cycle conditional: runs `transform` when the field equals
/// `value`.
pub fn when_field_equals<O: DynamicOps>(
    _ops: O,
    name: &str,
    value: impl Into<FieldValue>,
    transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    let name = name.to_owned();
    let expected = value.into();
    dynamic_rule(format!("when_field_equals({name})"), move |value| {
        let holds = value
            .get(&name)
            .ok()
            .is_some_and(|field| expected.matches(&field));
        conditional(value, holds, &transform)
    })
}

/// Single-cycle conditional: runs `transform` when `predicate` holds.
pub fn conditional_transform<O: DynamicOps>(
    _ops: O,
    predicate: impl Fn(&Dynamic<O>) -> bool + Send + Sync + 'static,
    transform: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    dynamic_rule("conditional_transform", move |value| {
        conditional(value, predicate(value), &transform)
    })
}

enum Condition {
    Exists,
    Missing,
    Equals(FieldValue),
}

struct ConditionalRule<O: DynamicOps> {
    label: String,
    field: String,
    condition: Condition,
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> crate::rules::Rule<O> for ConditionalRule<O> {
    fn name(&self) -> &str {
        &self.label
    }

    fn apply(
        &self,
        input: &crate::types::Typed<O>,
        ctx: &crate::context::FixContext<O>,
    ) -> Option<crate::types::Typed<O>> {
        let dynamic = input.encode();
        let holds = match &self.condition {
            Condition::Exists => dynamic.has(&self.field),
            Condition::Missing => dynamic.is_map() && !dynamic.has(&self.field),
            Condition::Equals(expected) => dynamic
                .get(&self.field)
                .ok()
                .is_some_and(|field| expected.matches(&field)),
        };
        if holds {
            self.rule.apply(input, ctx)
        } else {
            Some(input.clone())
        }
    }
}

fn conditional_rule<O: DynamicOps>(
    name: &str,
    condition: Condition,
    rule: BoxedRule<O>,
) -> BoxedRule<O> {
    Arc::new(ConditionalRule {
        label: format!("if_field({name})"),
        field: name.to_owned(),
        condition,
        rule,
    })
}
