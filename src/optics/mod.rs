//! Composable read/write paths over values.
//!
//! Each optic is a small value object carrying an `id` string for
//! composition debugging. Optics compose with `then` at equal capability and
//! weaken explicitly (`to_affine`, `to_traversal`) so that any two optics
//! compose at their least common capability:
//!
//! - [`Iso`]: a total bijection.
//! - [`Lens`]: total read, total write.
//! - [`Prism`]: partial read, total construct (for sums).
//! - [`Affine`]: partial read, write only where the location exists.
//! - [`Getter`]: read only.
//! - [`Traversal`]: modify every focus.
//!
//! [`Finder`](crate::optics::finder::Finder) is the dotted-path locator over
//! dynamics.

pub mod finder;

use std::sync::Arc;

pub use finder::Finder;

fn join_ids(left: &str, right: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_owned(),
        (_, true) => left.to_owned(),
        _ => format!("{left}.{right}"),
    }
}

/// A pure read: `S → A`.
pub struct Getter<S, A> {
    id: String,
    get: Arc<dyn Fn(&S) -> A + Send + Sync>,
}

impl<S, A> Clone for Getter<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            get: Arc::clone(&self.get),
        }
    }
}

impl<S: 'static, A: 'static> Getter<S, A> {
    /// Creates a getter.
    pub fn new(id: impl Into<String>, get: impl Fn(&S) -> A + Send + Sync + 'static) -> Self {
        Self {
            id: id.into(),
            get: Arc::new(get),
        }
    }

    /// The composition-debugging id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the focus.
    pub fn get(&self, source: &S) -> A {
        (self.get)(source)
    }

    /// Composes with another getter.
    pub fn then<B: 'static>(&self, other: &Getter<A, B>) -> Getter<S, B> {
        let first = Arc::clone(&self.get);
        let second = Arc::clone(&other.get);
        Getter {
            id: join_ids(&self.id, &other.id),
            get: Arc::new(move |source| second(&first(source))),
        }
    }
}

/// A total focus on one part of a product: read and write always succeed.
pub struct Lens<S, A> {
    id: String,
    get: Arc<dyn Fn(&S) -> A + Send + Sync>,
    set: Arc<dyn Fn(&S, A) -> S + Send + Sync>,
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<S: Clone + 'static, A: 'static> Lens<S, A> {
    /// Creates a lens from a getter and a setter.
    pub fn new(
        id: impl Into<String>,
        get: impl Fn(&S) -> A + Send + Sync + 'static,
        set: impl Fn(&S, A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            get: Arc::new(get),
            set: Arc::new(set),
        }
    }

    /// The composition-debugging id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the focus.
    pub fn get(&self, source: &S) -> A {
        (self.get)(source)
    }

    /// Replaces the focus.
    pub fn set(&self, source: &S, value: A) -> S {
        (self.set)(source, value)
    }

    /// Rewrites the focus.
    pub fn modify(&self, source: &S, f: impl FnOnce(A) -> A) -> S {
        self.set(source, f(self.get(source)))
    }

    /// Composes with another lens.
    pub fn then<B: 'static>(&self, other: &Lens<A, B>) -> Lens<S, B>
    where
        A: Clone,
    {
        let outer_get = Arc::clone(&self.get);
        let outer_set = Arc::clone(&self.set);
        let inner_get = Arc::clone(&other.get);
        let inner_set = Arc::clone(&other.set);
        let get = {
            let outer_get = Arc::clone(&outer_get);
            move |source: &S| inner_get(&outer_get(source))
        };
        Lens {
            id: join_ids(&self.id, &other.id),
            get: Arc::new(get),
            set: Arc::new(move |source, value| {
                outer_set(source, inner_set(&outer_get(source), value))
            }),
        }
    }

    /// Composes with a prism, weakening to an affine.
    pub fn then_prism<B: 'static>(&self, other: &Prism<A, B>) -> Affine<S, B>
    where
        A: Clone,
    {
        self.to_affine().then(&other.to_affine())
    }

    /// Forgets the setter.
    pub fn to_getter(&self) -> Getter<S, A> {
        let get = Arc::clone(&self.get);
        Getter {
            id: self.id.clone(),
            get,
        }
    }

    /// Weakens to an affine.
    pub fn to_affine(&self) -> Affine<S, A> {
        let get = Arc::clone(&self.get);
        let set = Arc::clone(&self.set);
        Affine {
            id: self.id.clone(),
            get_option: Arc::new(move |source| Some(get(source))),
            set: Arc::new(move |source, value| set(source, value)),
        }
    }

    /// Weakens to a traversal with a single focus.
    pub fn to_traversal(&self) -> Traversal<S, A> {
        self.to_affine().to_traversal()
    }
}

/// A partial focus on one variant of a sum: read may miss, construction is
/// total.
pub struct Prism<S, A> {
    id: String,
    get_option: Arc<dyn Fn(&S) -> Option<A> + Send + Sync>,
    reverse_get: Arc<dyn Fn(&A) -> S + Send + Sync>,
}

impl<S, A> Clone for Prism<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            get_option: Arc::clone(&self.get_option),
            reverse_get: Arc::clone(&self.reverse_get),
        }
    }
}

impl<S: Clone + 'static, A: 'static> Prism<S, A> {
    /// Creates a prism from a partial read and a total construction.
    pub fn new(
        id: impl Into<String>,
        get_option: impl Fn(&S) -> Option<A> + Send + Sync + 'static,
        reverse_get: impl Fn(&A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            get_option: Arc::new(get_option),
            reverse_get: Arc::new(reverse_get),
        }
    }

    /// The composition-debugging id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the focus, if the variant matches.
    pub fn get_option(&self, source: &S) -> Option<A> {
        (self.get_option)(source)
    }

    /// Rebuilds the whole from a focus.
    pub fn reverse_get(&self, value: &A) -> S {
        (self.reverse_get)(value)
    }

    /// Composes with another prism.
    pub fn then<B: 'static>(&self, other: &Prism<A, B>) -> Prism<S, B>
    where
        A: Clone,
    {
        let outer_get = Arc::clone(&self.get_option);
        let outer_rev = Arc::clone(&self.reverse_get);
        let inner_get = Arc::clone(&other.get_option);
        let inner_rev = Arc::clone(&other.reverse_get);
        Prism {
            id: join_ids(&self.id, &other.id),
            get_option: Arc::new(move |source| outer_get(source).and_then(|a| inner_get(&a))),
            reverse_get: Arc::new(move |value| outer_rev(&inner_rev(value))),
        }
    }

    /// Weakens to an affine: writing through a prism only succeeds where the
    /// variant already matches.
    pub fn to_affine(&self) -> Affine<S, A> {
        let get = Arc::clone(&self.get_option);
        let check = Arc::clone(&self.get_option);
        let rev = Arc::clone(&self.reverse_get);
        Affine {
            id: self.id.clone(),
            get_option: Arc::new(move |source| get(source)),
            set: Arc::new(move |source, value| {
                if check(source).is_some() {
                    rev(&value)
                } else {
                    source.clone()
                }
            }),
        }
    }

    /// Weakens to a traversal.
    pub fn to_traversal(&self) -> Traversal<S, A> {
        self.to_affine().to_traversal()
    }
}

/// A total bijection between two representations.
pub struct Iso<S, A> {
    id: String,
    to: Arc<dyn Fn(&S) -> A + Send + Sync>,
    from: Arc<dyn Fn(&A) -> S + Send + Sync>,
}

impl<S, A> Clone for Iso<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            to: Arc::clone(&self.to),
            from: Arc::clone(&self.from),
        }
    }
}

impl<S: Clone + 'static, A: Clone + 'static> Iso<S, A> {
    /// Creates an iso from the two directions.
    pub fn new(
        id: impl Into<String>,
        to: impl Fn(&S) -> A + Send + Sync + 'static,
        from: impl Fn(&A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            to: Arc::new(to),
            from: Arc::new(from),
        }
    }

    /// The composition-debugging id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Maps forward.
    pub fn to(&self, source: &S) -> A {
        (self.to)(source)
    }

    /// Maps backward.
    pub fn from(&self, value: &A) -> S {
        (self.from)(value)
    }

    /// Swaps the two directions.
    pub fn reverse(&self) -> Iso<A, S> {
        Iso {
            id: format!("{}^-1", self.id),
            to: Arc::clone(&self.from),
            from: Arc::clone(&self.to),
        }
    }

    /// Composes with another iso.
    pub fn then<B: Clone + 'static>(&self, other: &Iso<A, B>) -> Iso<S, B> {
        let outer_to = Arc::clone(&self.to);
        let outer_from = Arc::clone(&self.from);
        let inner_to = Arc::clone(&other.to);
        let inner_from = Arc::clone(&other.from);
        Iso {
            id: join_ids(&self.id, &other.id),
            to: Arc::new(move |source| inner_to(&outer_to(source))),
            from: Arc::new(move |value| outer_from(&inner_from(value))),
        }
    }

    /// Strengthens into a lens (always lawful for an iso).
    pub fn to_lens(&self) -> Lens<S, A> {
        let to = Arc::clone(&self.to);
        let from = Arc::clone(&self.from);
        Lens {
            id: self.id.clone(),
            get: Arc::new(move |source| to(source)),
            set: Arc::new(move |_, value| from(&value)),
        }
    }

    /// Views as a prism that always matches.
    pub fn to_prism(&self) -> Prism<S, A> {
        let to = Arc::clone(&self.to);
        let from = Arc::clone(&self.from);
        Prism {
            id: self.id.clone(),
            get_option: Arc::new(move |source| Some(to(source))),
            reverse_get: Arc::new(move |value| from(value)),
        }
    }
}

/// A partial lens: read may miss, and writing to a missing location is a
/// no-op.
pub struct Affine<S, A> {
    id: String,
    get_option: Arc<dyn Fn(&S) -> Option<A> + Send + Sync>,
    set: Arc<dyn Fn(&S, A) -> S + Send + Sync>,
}

impl<S, A> Clone for Affine<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            get_option: Arc::clone(&self.get_option),
            set: Arc::clone(&self.set),
        }
    }
}

impl<S: Clone + 'static, A: 'static> Affine<S, A> {
    /// Creates an affine from a partial read and a partial write.
    pub fn new(
        id: impl Into<String>,
        get_option: impl Fn(&S) -> Option<A> + Send + Sync + 'static,
        set: impl Fn(&S, A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            get_option: Arc::new(get_option),
            set: Arc::new(set),
        }
    }

    /// The composition-debugging id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the focus, if it exists.
    pub fn get_option(&self, source: &S) -> Option<A> {
        (self.get_option)(source)
    }

    /// Replaces the focus. A no-op if the location is missing.
    pub fn set(&self, source: &S, value: A) -> S {
        (self.set)(source, value)
    }

    /// Rewrites the focus, if it exists.
    pub fn modify(&self, source: &S, f: impl FnOnce(A) -> A) -> S {
        match self.get_option(source) {
            Some(value) => self.set(source, f(value)),
            None => source.clone(),
        }
    }

    /// Composes with another affine.
    pub fn then<B: 'static>(&self, other: &Affine<A, B>) -> Affine<S, B>
    where
        A: Clone,
    {
        let outer_get = Arc::clone(&self.get_option);
        let outer_set = Arc::clone(&self.set);
        let inner_get = Arc::clone(&other.get_option);
        let inner_set = Arc::clone(&other.set);
        let get = {
            let outer_get = Arc::clone(&outer_get);
            let inner_get = Arc::clone(&inner_get);
            move |source: &S| outer_get(source).and_then(|a| inner_get(&a))
        };
        Affine {
            id: join_ids(&self.id, &other.id),
            get_option: Arc::new(get),
            set: Arc::new(move |source, value| match outer_get(source) {
                Some(a) => outer_set(source, inner_set(&a, value)),
                None => source.clone(),
            }),
        }
    }

    /// Weakens to a traversal over zero or one focus.
    pub fn to_traversal(&self) -> Traversal<S, A> {
        let get = Arc::clone(&self.get_option);
        let set = Arc::clone(&self.set);
        Traversal {
            id: self.id.clone(),
            modify: Arc::new(move |source, f| match get(source) {
                Some(value) => set(source, f(value)),
                None => source.clone(),
            }),
        }
    }
}

type ModifyFn<S, A> = dyn Fn(&S, &mut dyn FnMut(A) -> A) -> S + Send + Sync;

/// A bulk rewrite over every focus inside a value.
pub struct Traversal<S, A> {
    id: String,
    modify: Arc<ModifyFn<S, A>>,
}

impl<S, A> Clone for Traversal<S, A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            modify: Arc::clone(&self.modify),
        }
    }
}

impl<S: Clone + 'static, A: 'static> Traversal<S, A> {
    /// Creates a traversal from a bulk-modify function.
    pub fn new(
        id: impl Into<String>,
        modify: impl Fn(&S, &mut dyn FnMut(A) -> A) -> S + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            modify: Arc::new(modify),
        }
    }

    /// The composition-debugging id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rewrites every focus.
    pub fn modify(&self, source: &S, mut f: impl FnMut(A) -> A) -> S {
        (self.modify)(source, &mut f)
    }

    /// Composes with another traversal.
    pub fn then<B: 'static>(&self, other: &Traversal<A, B>) -> Traversal<S, B>
    where
        A: Clone,
    {
        let outer = Arc::clone(&self.modify);
        let inner = Arc::clone(&other.modify);
        Traversal {
            id: join_ids(&self.id, &other.id),
            modify: Arc::new(move |source, f| {
                outer(source, &mut |a| inner(&a, &mut |b| f(b)))
            }),
        }
    }
}
