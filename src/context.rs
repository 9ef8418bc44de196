//! The per-call context threaded through every fix, carrying log sinks and
//! the optional diagnostic recorder.

use std::{
    cell::RefCell,
    fmt,
    sync::Arc,
    time::{
        Duration,
        Instant,
        SystemTime,
    },
};

use serde::Serialize;
use tracing::{
    info,
    warn,
};

use crate::{
    dynamic::Dynamic,
    ops::DynamicOps,
    version::DataVersion,
};

/// One rule application observed while a fix ran.
#[derive(Clone, Debug, Serialize)]
pub struct RuleApplication {
    /// The rule's name.
    pub rule_name: String,
    /// The shape the rule was applied to.
    pub type_name: String,
    /// When the rule ran.
    pub timestamp: SystemTime,
    /// How long it took.
    pub duration: Duration,
    /// Whether the rule matched.
    pub matched: bool,
    /// Optional free-form detail.
    pub description: Option<String>,
}

/// One fix execution observed during a migration.
#[derive(Clone, Debug, Serialize)]
pub struct FixExecution {
    /// The fix's name.
    pub fix_name: String,
    /// The version the fix migrates from.
    pub from_version: DataVersion,
    /// The version the fix migrates to.
    pub to_version: DataVersion,
    /// When the fix started.
    pub start_time: SystemTime,
    /// How long it took.
    pub duration: Duration,
    /// Every rule application recorded while the fix ran.
    pub rule_applications: Vec<RuleApplication>,
    /// Serialised input, when a snapshot serialiser is installed.
    pub before_snapshot: Option<String>,
    /// Serialised output, when a snapshot serialiser is installed.
    pub after_snapshot: Option<String>,
}

/// The diagnostic record of one migration call.
#[derive(Clone, Debug, Serialize)]
pub struct MigrationReport {
    /// Every fix execution, in application order.
    pub fix_executions: Vec<FixExecution>,
    /// Total time spent inside fixes.
    pub total_duration: Duration,
}

/// Serialises a dynamic into a snapshot string for diagnostics.
pub type SnapshotFn<O> = Arc<dyn Fn(&Dynamic<O>) -> String + Send + Sync>;

struct CurrentFix {
    execution: FixExecution,
    started: Instant,
}

#[derive(Default)]
struct Recorder {
    executions: Vec<FixExecution>,
    current: Option<CurrentFix>,
}

/// The context passed to every fix during one migration call.
///
/// Offers `info`/`warn` sinks and, when built with
/// [`FixContext::recording`], accumulates a [`MigrationReport`]. The
/// recorder is scoped to a single migration invocation and is not
/// thread-safe; a fresh context must be used per concurrent call. A
/// non-recording context costs nothing per rule.
pub struct FixContext<O: DynamicOps> {
    recorder: Option<RefCell<Recorder>>,
    snapshots: Option<SnapshotFn<O>>,
}

impl<O: DynamicOps> Default for FixContext<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: DynamicOps> FixContext<O> {
    /// A silent context: log sinks only, no recording.
    pub fn new() -> Self {
        Self {
            recorder: None,
            snapshots: None,
        }
    }

    /// A recording context: accumulates a [`MigrationReport`].
    pub fn recording() -> Self {
        Self {
            recorder: Some(RefCell::new(Recorder::default())),
            snapshots: None,
        }
    }

    /// Installs a snapshot serialiser; recorded fix executions will carry
    /// before/after snapshots produced by it.
    pub fn with_snapshots(
        mut self,
        serializer: impl Fn(&Dynamic<O>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.snapshots = Some(Arc::new(serializer));
        self
    }

    /// Whether this context records diagnostics.
    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Informational sink for fix authors.
    pub fn info(&self, message: impl fmt::Display) {
        info!(target: "datafix", "{message}");
    }

    /// Warning sink for fix authors.
    pub fn warn(&self, message: impl fmt::Display) {
        warn!(target: "datafix", "{message}");
    }

    pub(crate) fn snapshot(&self, dynamic: &Dynamic<O>) -> Option<String> {
        self.snapshots.as_ref().map(|serializer| serializer(dynamic))
    }

    pub(crate) fn record_rule(&self, application: RuleApplication) {
        if let Some(recorder) = &self.recorder {
            let mut recorder = recorder.borrow_mut();
            if let Some(current) = &mut recorder.current {
                current.execution.rule_applications.push(application);
            }
        }
    }

    pub(crate) fn begin_fix(
        &self,
        name: &str,
        from: DataVersion,
        to: DataVersion,
        before_snapshot: Option<String>,
    ) {
        if let Some(recorder) = &self.recorder {
            recorder.borrow_mut().current = Some(CurrentFix {
                execution: FixExecution {
                    fix_name: name.to_owned(),
                    from_version: from,
                    to_version: to,
                    start_time: SystemTime::now(),
                    duration: Duration::ZERO,
                    rule_applications: Vec::new(),
                    before_snapshot,
                    after_snapshot: None,
                },
                started: Instant::now(),
            });
        }
    }

    pub(crate) fn end_fix(&self, after_snapshot: Option<String>) {
        if let Some(recorder) = &self.recorder {
            let mut recorder = recorder.borrow_mut();
            if let Some(mut current) = recorder.current.take() {
                current.execution.duration = current.started.elapsed();
                current.execution.after_snapshot = after_snapshot;
                recorder.executions.push(current.execution);
            }
        }
    }

    /// The report accumulated so far, if this context records.
    ///
    /// The total duration is the time spent inside fixes.
    pub fn report(&self) -> Option<MigrationReport> {
        self.recorder.as_ref().map(|recorder| {
            let recorder = recorder.borrow();
            MigrationReport {
                total_duration: recorder
                    .executions
                    .iter()
                    .map(|execution| execution.duration)
                    .sum(),
                fix_executions: recorder.executions.clone(),
            }
        })
    }
}

/// Reusable settings from which the fixer builds a default [`FixContext`]
/// when the caller does not supply one.
pub struct ContextConfig<O: DynamicOps> {
    snapshots: Option<SnapshotFn<O>>,
}

impl<O: DynamicOps> Clone for ContextConfig<O> {
    fn clone(&self) -> Self {
        Self {
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<O: DynamicOps> Default for ContextConfig<O> {
    fn default() -> Self {
        Self { snapshots: None }
    }
}

impl<O: DynamicOps> ContextConfig<O> {
    /// Default settings: silent contexts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a snapshot serialiser for default contexts.
    pub fn with_snapshots(
        mut self,
        serializer: impl Fn(&Dynamic<O>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.snapshots = Some(Arc::new(serializer));
        self
    }

    pub(crate) fn build(&self) -> FixContext<O> {
        FixContext {
            recorder: None,
            snapshots: self.snapshots.clone(),
        }
    }
}
