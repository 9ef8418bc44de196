//! The rewrite-rule combinator language used to author fix bodies.
//!
//! A [`Rule`] takes a [`Typed`] value and either produces a transformed
//! value or reports that it did not match; "did not match" is a first-class
//! result that [`choice`] and [`seq`] compose on, not an error. Leaf rules
//! run their transform and re-check the result against the input's shape in
//! a single encode/decode cycle; [`batch`](crate::rules::batch::batch) fuses
//! many field operations into one such cycle.

pub mod batch;
pub mod fields;
pub mod path;

use std::{
    sync::Arc,
    time::{
        Instant,
        SystemTime,
    },
};

use tracing::debug;

use crate::{
    context::{
        FixContext,
        RuleApplication,
    },
    dynamic::Dynamic,
    ops::DynamicOps,
    types::{
        DataType,
        Typed,
    },
};

pub use self::{
    batch::{
        BatchBuilder,
        batch,
    },
    fields::*,
};

/// A rewrite rule over [`Typed`] values.
///
/// Returning `None` means the rule did not apply; the input is left for the
/// enclosing combinator to handle. Conversion failures inside a rule's
/// transform surface as `None`, never as panics.
pub trait Rule<O: DynamicOps>: Send + Sync {
    /// The rule's name, used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Applies the rule.
    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>>;
}

/// A shareable rule.
pub type BoxedRule<O> = Arc<dyn Rule<O>>;

/// The outcome of a leaf rule's transform, before shape re-checking.
pub(crate) enum Transformed<O: DynamicOps> {
    /// The transform ran and produced a new value.
    Changed(Dynamic<O>),
    /// The transform did not fire; the rule still matches, as a no-op.
    Unchanged,
    /// The rule does not apply to this value.
    Failed,
}

struct DynamicRule<O: DynamicOps> {
    name: String,
    description: Option<String>,
    transform: Arc<dyn Fn(&Dynamic<O>) -> Transformed<O> + Send + Sync>,
}

impl<O: DynamicOps> Rule<O> for DynamicRule<O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        let started = Instant::now();
        let timestamp = SystemTime::now();

        let (matched, output) = match (self.transform)(&input.encode()) {
            Transformed::Changed(dynamic) => {
                // Read the result back at the input's shape. Migrations
                // legitimately change shapes, so a result that no longer
                // conforms degrades to passthrough typing instead of
                // failing the rule.
                let typed = match input.data_type().read(&dynamic).ok() {
                    Some(typed) => typed,
                    None => Typed::unchecked(DataType::Passthrough, dynamic),
                };
                (true, Some(typed))
            }
            Transformed::Unchanged => (false, Some(input.clone())),
            Transformed::Failed => (false, None),
        };

        if ctx.is_recording() {
            ctx.record_rule(RuleApplication {
                rule_name: self.name.clone(),
                type_name: input.data_type().to_string(),
                timestamp,
                duration: started.elapsed(),
                matched,
                description: self.description.clone(),
            });
        }

        output
    }
}

/// Builds a leaf rule from a dynamic transform. The result is re-checked
/// against the input's shape, so the whole rule is one encode/decode cycle.
pub(crate) fn dynamic_rule<O: DynamicOps>(
    name: impl Into<String>,
    transform: impl Fn(&Dynamic<O>) -> Transformed<O> + Send + Sync + 'static,
) -> BoxedRule<O> {
    Arc::new(DynamicRule {
        name: name.into(),
        description: None,
        transform: Arc::new(transform),
    })
}

struct Seq<O: DynamicOps> {
    rules: Vec<BoxedRule<O>>,
}

impl<O: DynamicOps> Rule<O> for Seq<O> {
    fn name(&self) -> &str {
        "seq"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        let mut current = input.clone();
        for rule in &self.rules {
            current = rule.apply(&current, ctx)?;
        }
        Some(current)
    }
}

/// Strict sequencing: stops and reports a non-match at the first rule that
/// does not match.
pub fn seq<O: DynamicOps>(rules: Vec<BoxedRule<O>>) -> BoxedRule<O> {
    Arc::new(Seq { rules })
}

struct SeqAll<O: DynamicOps> {
    rules: Vec<BoxedRule<O>>,
}

impl<O: DynamicOps> Rule<O> for SeqAll<O> {
    fn name(&self) -> &str {
        "seq_all"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        let mut current = input.clone();
        for rule in &self.rules {
            if let Some(next) = rule.apply(&current, ctx) {
                current = next;
            }
        }
        Some(current)
    }
}

/// Forgiving sequencing: every non-match becomes a no-op; always matches.
pub fn seq_all<O: DynamicOps>(rules: Vec<BoxedRule<O>>) -> BoxedRule<O> {
    Arc::new(SeqAll { rules })
}

struct Choice<O: DynamicOps> {
    rules: Vec<BoxedRule<O>>,
}

impl<O: DynamicOps> Rule<O> for Choice<O> {
    fn name(&self) -> &str {
        "choice"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        self.rules.iter().find_map(|rule| rule.apply(input, ctx))
    }
}

/// First match wins.
pub fn choice<O: DynamicOps>(rules: Vec<BoxedRule<O>>) -> BoxedRule<O> {
    Arc::new(Choice { rules })
}

struct TryOnce<O: DynamicOps> {
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> Rule<O> for TryOnce<O> {
    fn name(&self) -> &str {
        "try_once"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        self.rule
            .apply(input, ctx)
            .or_else(|| Some(input.clone()))
    }
}

/// Turns a non-match into a no-op.
pub fn try_once<O: DynamicOps>(rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(TryOnce { rule })
}

struct CheckOnce<O: DynamicOps> {
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> Rule<O> for CheckOnce<O> {
    fn name(&self) -> &str {
        "check_once"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        self.rule.apply(input, ctx)
    }
}

/// Transparent wrapper, reserved for future validation.
pub fn check_once<O: DynamicOps>(rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(CheckOnce { rule })
}

struct Noop;

impl<O: DynamicOps> Rule<O> for Noop {
    fn name(&self) -> &str {
        "noop"
    }

    fn apply(&self, input: &Typed<O>, _ctx: &FixContext<O>) -> Option<Typed<O>> {
        Some(input.clone())
    }
}

/// The identity rule.
pub fn noop<O: DynamicOps>() -> BoxedRule<O> {
    Arc::new(Noop)
}

struct IfType<O: DynamicOps> {
    target: DataType,
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> Rule<O> for IfType<O> {
    fn name(&self) -> &str {
        "if_type"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        if input.data_type() == &self.target {
            self.rule.apply(input, ctx)
        } else {
            None
        }
    }
}

/// Delegates only when the input's shape matches `target`.
pub fn if_type<O: DynamicOps>(target: DataType, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(IfType { target, rule })
}

struct Log<O: DynamicOps> {
    message: String,
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> Rule<O> for Log<O> {
    fn name(&self) -> &str {
        &self.message
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        let output = self.rule.apply(input, ctx);
        debug!(
            target: "datafix",
            rule = self.rule.name(),
            matched = output.is_some(),
            "{}",
            self.message,
        );
        output
    }
}

/// Wraps a rule with a one-line trace sink.
pub fn log<O: DynamicOps>(message: impl Into<String>, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(Log {
        message: message.into(),
        rule,
    })
}

enum Children<O: DynamicOps> {
    Map(Vec<(Dynamic<O>, Typed<O>)>),
    List(Vec<Typed<O>>),
    Leaf,
}

fn children_of<O: DynamicOps>(input: &Typed<O>) -> Children<O> {
    let dynamic = input.encode();
    if let Some(entries) = dynamic.as_map().ok() {
        Children::Map(
            entries
                .into_iter()
                .map(|(key, value)| {
                    let field_type = match key.as_string().ok() {
                        Some(name) => input.data_type().field_type(&name),
                        None => DataType::Passthrough,
                    };
                    (key, Typed::unchecked(field_type, value))
                })
                .collect(),
        )
    } else if let Some(items) = dynamic.as_list().ok() {
        let element_type = input.data_type().element_type();
        Children::List(
            items
                .into_iter()
                .map(|item| Typed::unchecked(element_type.clone(), item))
                .collect(),
        )
    } else {
        Children::Leaf
    }
}

fn rebuild_map<O: DynamicOps>(
    input: &Typed<O>,
    entries: Vec<(Dynamic<O>, Typed<O>)>,
) -> Typed<O> {
    let dynamic = input.encode();
    let rebuilt = dynamic.create_map(
        entries
            .into_iter()
            .map(|(key, value)| (key, value.into_dynamic())),
    );
    Typed::unchecked(input.data_type().clone(), rebuilt)
}

fn rebuild_list<O: DynamicOps>(input: &Typed<O>, items: Vec<Typed<O>>) -> Typed<O> {
    let dynamic = input.encode();
    let rebuilt = dynamic.create_list(items.into_iter().map(Typed::into_dynamic));
    Typed::unchecked(input.data_type().clone(), rebuilt)
}

struct All<O: DynamicOps> {
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> Rule<O> for All<O> {
    fn name(&self) -> &str {
        "all"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        match children_of(input) {
            Children::Map(entries) => {
                let rewritten = entries
                    .into_iter()
                    .map(|(key, child)| self.rule.apply(&child, ctx).map(|child| (key, child)))
                    .collect::<Option<Vec<_>>>()?;
                Some(rebuild_map(input, rewritten))
            }
            Children::List(items) => {
                let rewritten = items
                    .into_iter()
                    .map(|child| self.rule.apply(&child, ctx))
                    .collect::<Option<Vec<_>>>()?;
                Some(rebuild_list(input, rewritten))
            }
            Children::Leaf => Some(input.clone()),
        }
    }
}

/// Applies `rule` to every immediate child; all children must match.
pub fn all<O: DynamicOps>(_ops: O, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(All { rule })
}

struct One<O: DynamicOps> {
    rule: BoxedRule<O>,
}

impl<O: DynamicOps> Rule<O> for One<O> {
    fn name(&self) -> &str {
        "one"
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        match children_of(input) {
            Children::Map(entries) => {
                let mut matched = false;
                let mut rewritten = Vec::with_capacity(entries.len());
                for (key, child) in entries {
                    if !matched {
                        if let Some(child) = self.rule.apply(&child, ctx) {
                            matched = true;
                            rewritten.push((key, child));
                            continue;
                        }
                    }
                    rewritten.push((key, child));
                }
                matched.then(|| rebuild_map(input, rewritten))
            }
            Children::List(items) => {
                let mut matched = false;
                let mut rewritten = Vec::with_capacity(items.len());
                for child in items {
                    if !matched {
                        if let Some(child) = self.rule.apply(&child, ctx) {
                            matched = true;
                            rewritten.push(child);
                            continue;
                        }
                    }
                    rewritten.push(child);
                }
                matched.then(|| rebuild_list(input, rewritten))
            }
            Children::Leaf => None,
        }
    }
}

/// Applies `rule` to the first matching child only; `None` if no child
/// matches.
pub fn one<O: DynamicOps>(_ops: O, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(One { rule })
}

struct Recurse<O: DynamicOps> {
    name: &'static str,
    rule: BoxedRule<O>,
    bottom_up: bool,
}

impl<O: DynamicOps> Recurse<O> {
    fn descend(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Typed<O> {
        match children_of(input) {
            Children::Map(entries) => {
                let rewritten = entries
                    .into_iter()
                    .map(|(key, child)| {
                        (key, self.apply(&child, ctx).unwrap_or(child))
                    })
                    .collect();
                rebuild_map(input, rewritten)
            }
            Children::List(items) => {
                let rewritten = items
                    .into_iter()
                    .map(|child| self.apply(&child, ctx).unwrap_or(child))
                    .collect();
                rebuild_list(input, rewritten)
            }
            Children::Leaf => input.clone(),
        }
    }
}

impl<O: DynamicOps> Rule<O> for Recurse<O> {
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, input: &Typed<O>, ctx: &FixContext<O>) -> Option<Typed<O>> {
        if self.bottom_up {
            let descended = self.descend(input, ctx);
            let applied = self
                .rule
                .apply(&descended, ctx)
                .unwrap_or(descended);
            Some(applied)
        } else {
            let applied = self
                .rule
                .apply(input, ctx)
                .unwrap_or_else(|| input.clone());
            Some(self.descend(&applied, ctx))
        }
    }
}

/// Applies `rule` everywhere: to the value itself (no-op on a miss), then
/// recursively to every child. Always matches.
pub fn everywhere<O: DynamicOps>(_ops: O, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(Recurse {
        name: "everywhere",
        rule,
        bottom_up: false,
    })
}

/// Pre-order recursive application: self first, then children.
pub fn top_down<O: DynamicOps>(_ops: O, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(Recurse {
        name: "top_down",
        rule,
        bottom_up: false,
    })
}

/// Post-order recursive application: children first, then self.
pub fn bottom_up<O: DynamicOps>(_ops: O, rule: BoxedRule<O>) -> BoxedRule<O> {
    Arc::new(Recurse {
        name: "bottom_up",
        rule,
        bottom_up: true,
    })
}
