//! [`DataFix`] is one named migration step between two versions of a data
//! kind.

use crate::{
    context::FixContext,
    dynamic::Dynamic,
    ops::DynamicOps,
    rules::BoxedRule,
    types::DataType,
    version::{
        DataVersion,
        TypeReference,
    },
};

/// A named transformation declaring the version interval it bridges.
///
/// A fix is identified by its `(name, from, to)` triple for reporting; its
/// semantics come entirely from [`DataFix::apply`]. The interval must be
/// ascending: `from < to`.
pub trait DataFix<O: DynamicOps>: Send + Sync {
    /// The fix's name.
    fn name(&self) -> &str;

    /// The version the fix migrates from.
    fn from_version(&self) -> DataVersion;

    /// The version the fix migrates to.
    fn to_version(&self) -> DataVersion;

    /// Transforms the dynamic. Recoverable failures should surface through
    /// `DataResult` inside the transform and leave the input unchanged, not
    /// panic.
    fn apply(
        &self,
        reference: &TypeReference,
        input: Dynamic<O>,
        ctx: &FixContext<O>,
    ) -> Dynamic<O>;
}

/// A fix whose body is a rewrite rule.
///
/// The input is checked against the declared shape, threaded through the
/// rule, and encoded back; a rule that does not match leaves the input
/// unchanged.
pub struct RuleFix<O: DynamicOps> {
    name: String,
    from: DataVersion,
    to: DataVersion,
    dtype: DataType,
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> RuleFix<O> {
    /// Creates a rule-backed fix reading its input as
    /// [`DataType::Passthrough`].
    ///
    /// # Panics
    /// If `from >= to`.
    pub fn new(
        name: impl Into<String>,
        from: DataVersion,
        to: DataVersion,
        rule: BoxedRule<O>,
    ) -> Self {
        assert!(from < to, "Fix interval must be ascending: {from} -> {to}");
        Self {
            name: name.into(),
            from,
            to,
            dtype: DataType::Passthrough,
            rule,
        }
    }

    /// Declares the shape the input is checked against before the rule
    /// runs.
    pub fn with_type(mut self, dtype: DataType) -> Self {
        self.dtype = dtype;
        self
    }
}

impl<O: DynamicOps> DataFix<O> for RuleFix<O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn from_version(&self) -> DataVersion {
        self.from
    }

    fn to_version(&self) -> DataVersion {
        self.to
    }

    fn apply(
        &self,
        _reference: &TypeReference,
        input: Dynamic<O>,
        ctx: &FixContext<O>,
    ) -> Dynamic<O> {
        match self.dtype.read(&input).ok() {
            Some(typed) => match self.rule.apply(&typed, ctx) {
                Some(output) => output.encode(),
                None => input,
            },
            None => {
                ctx.warn(format!(
                    "fix {}: input is not a {}, skipping",
                    self.name, self.dtype,
                ));
                input
            }
        }
    }
}

/// A fix whose body is a plain function.
pub struct FunctionFix<O: DynamicOps, F> {
    name: String,
    from: DataVersion,
    to: DataVersion,
    f: F,
    _marker: std::marker::PhantomData<fn(&O)>,
}

impl<O, F> FunctionFix<O, F>
where
    O: DynamicOps,
    F: Fn(&TypeReference, Dynamic<O>, &FixContext<O>) -> Dynamic<O> + Send + Sync,
{
    /// Creates a function-backed fix.
    ///
    /// # Panics
    /// If `from >= to`.
    pub fn new(name: impl Into<String>, from: DataVersion, to: DataVersion, f: F) -> Self {
        assert!(from < to, "Fix interval must be ascending: {from} -> {to}");
        Self {
            name: name.into(),
            from,
            to,
            f,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<O, F> DataFix<O> for FunctionFix<O, F>
where
    O: DynamicOps,
    F: Fn(&TypeReference, Dynamic<O>, &FixContext<O>) -> Dynamic<O> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn from_version(&self) -> DataVersion {
        self.from
    }

    fn to_version(&self) -> DataVersion {
        self.to
    }

    fn apply(
        &self,
        reference: &TypeReference,
        input: Dynamic<O>,
        ctx: &FixContext<O>,
    ) -> Dynamic<O> {
        (self.f)(reference, input, ctx)
    }
}
