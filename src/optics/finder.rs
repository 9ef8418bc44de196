//! [`Finder`] is a lazy, composable locator over dynamics: a chain of named
//! fields and list indices with a readable dotted id.

use std::fmt;

use crate::{
    dynamic::Dynamic,
    ops::DynamicOps,
};

/// One atomic locator step.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FinderStep {
    /// A named child of a map-shaped value.
    Field(String),
    /// A positional element of a list-shaped value.
    Index(usize),
}

impl fmt::Display for FinderStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => index.fmt(f),
        }
    }
}

/// A lazy locator built by chaining [`FinderStep`]s.
///
/// Applied to a dynamic it yields the located child, or nothing if any step
/// misses; writing through a finder rebuilds the enclosing containers
/// copy-on-write.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Finder {
    id: String,
    steps: Vec<FinderStep>,
}

impl Finder {
    /// The empty chain: locates its argument.
    pub fn identity() -> Self {
        Self {
            id: String::new(),
            steps: Vec::new(),
        }
    }

    /// Locates a named child in a map-shaped dynamic.
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            steps: vec![FinderStep::Field(name)],
        }
    }

    /// Locates the `index`-th element of a list-shaped dynamic.
    pub fn index(index: usize) -> Self {
        Self {
            id: index.to_string(),
            steps: vec![FinderStep::Index(index)],
        }
    }

    pub(crate) fn from_steps(steps: Vec<FinderStep>) -> Self {
        let id = steps
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self { id, steps }
    }

    /// The readable dotted id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The chain of steps.
    pub fn steps(&self) -> &[FinderStep] {
        &self.steps
    }

    /// Chains another finder after this one.
    pub fn then(&self, other: &Finder) -> Finder {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        let id = match (self.id.is_empty(), other.id.is_empty()) {
            (true, _) => other.id.clone(),
            (_, true) => self.id.clone(),
            _ => format!("{}.{}", self.id, other.id),
        };
        Finder { id, steps }
    }

    /// Locates the child, or `None` if any step misses.
    pub fn find<O: DynamicOps>(&self, root: &Dynamic<O>) -> Option<Dynamic<O>> {
        let mut current = root.clone();
        for step in &self.steps {
            current = match step {
                FinderStep::Field(name) => current.get(name).ok()?,
                FinderStep::Index(index) => {
                    let items = current.as_list().ok()?;
                    items.get(*index)?.clone()
                }
            };
        }
        Some(current)
    }

    /// Replaces the located child, rebuilding the enclosing containers
    /// copy-on-write. A no-op if the location is missing.
    pub fn set<O: DynamicOps>(&self, root: &Dynamic<O>, child: Dynamic<O>) -> Dynamic<O> {
        set_steps(&self.steps, root, child, false).unwrap_or_else(|| root.clone())
    }

    /// Like [`Finder::set`], but absent intermediate fields are created as
    /// empty maps. Index steps are never created.
    pub fn set_or_create<O: DynamicOps>(&self, root: &Dynamic<O>, child: Dynamic<O>) -> Dynamic<O> {
        set_steps(&self.steps, root, child, true).unwrap_or_else(|| root.clone())
    }

    /// Rewrites the located child. A no-op if the location is missing.
    pub fn update<O: DynamicOps>(
        &self,
        root: &Dynamic<O>,
        f: impl FnOnce(Dynamic<O>) -> Dynamic<O>,
    ) -> Dynamic<O> {
        match self.find(root) {
            Some(child) => self.set(root, f(child)),
            None => root.clone(),
        }
    }

    /// Removes the located child from its parent container. A no-op if the
    /// location is missing or the chain is empty.
    pub fn remove<O: DynamicOps>(&self, root: &Dynamic<O>) -> Dynamic<O> {
        let Some((last, parents)) = self.steps.split_last() else {
            return root.clone();
        };
        let parent_finder = Finder::from_steps(parents.to_vec());
        let Some(parent) = parent_finder.find(root) else {
            return root.clone();
        };
        let removed = match last {
            FinderStep::Field(name) => {
                if !parent.has(name) {
                    return root.clone();
                }
                parent.remove(name)
            }
            FinderStep::Index(index) => {
                let Some(items) = parent.as_list().ok() else {
                    return root.clone();
                };
                if *index >= items.len() {
                    return root.clone();
                }
                let remaining = items
                    .into_iter()
                    .enumerate()
                    .filter(|&(i, _)| i != *index)
                    .map(|(_, item)| item);
                parent.create_list(remaining)
            }
        };
        parent_finder.set(root, removed)
    }
}

fn set_steps<O: DynamicOps>(
    steps: &[FinderStep],
    node: &Dynamic<O>,
    child: Dynamic<O>,
    create: bool,
) -> Option<Dynamic<O>> {
    let Some((step, rest)) = steps.split_first() else {
        return Some(child);
    };

    match step {
        FinderStep::Field(name) => {
            let inner = match node.get(name).ok() {
                Some(inner) => inner,
                None if create && (node.is_map() || node.is_null()) => node.empty_map(),
                None => return None,
            };
            let rebuilt = set_steps(rest, &inner, child, create)?;
            let base = if node.is_map() {
                node.clone()
            } else if create && node.is_null() {
                node.empty_map()
            } else {
                return None;
            };
            Some(base.set(name, rebuilt))
        }
        FinderStep::Index(index) => {
            let items = node.as_list().ok()?;
            let inner = items.get(*index)?.clone();
            let rebuilt = set_steps(rest, &inner, child, create)?;
            let replaced = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| if i == *index { rebuilt.clone() } else { item });
            Some(node.create_list(replaced))
        }
    }
}

impl fmt::Display for Finder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
