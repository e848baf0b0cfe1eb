//! Reporting of application callback failures.
//!
//! Attribute queries run from paint and format handlers, so a failing
//! callback fails again on every redraw and for every row. Each failure class
//! is reported once per session; repeats are only counted and traced.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::GridError;
use crate::logging::targets;
use crate::types::QueryReason;

/// Error type returned by application callbacks.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by application callbacks.
pub type CallbackResult = std::result::Result<(), CallbackError>;

/// Hook invoked for the first occurrence of each failure.
pub type FailureHook = Arc<dyn Fn(&CallbackFailure) + Send + Sync>;

/// Which callback failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackStage {
    /// The row attribute callback.
    Row,
    /// The cell attribute callback.
    Cell,
}

impl CallbackStage {
    pub fn name(&self) -> &'static str {
        match self {
            CallbackStage::Row => "row",
            CallbackStage::Cell => "cell",
        }
    }
}

impl fmt::Display for CallbackStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A failure raised by an application callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    /// Which callback failed.
    pub stage: CallbackStage,
    /// Row being resolved.
    pub row: usize,
    /// Column being resolved, for cell callbacks.
    pub column: Option<usize>,
    /// Reason of the query.
    pub reason: QueryReason,
    /// The callback's error message.
    pub message: String,
}

impl CallbackFailure {
    pub(crate) fn new(
        stage: CallbackStage,
        row: usize,
        column: Option<usize>,
        reason: QueryReason,
        error: &CallbackError,
    ) -> Self {
        Self {
            stage,
            row,
            column,
            reason,
            message: error.to_string(),
        }
    }

    /// The failure as a [`GridError::Callback`].
    pub fn to_error(&self) -> GridError {
        GridError::callback(self.stage.name(), self.message.clone())
    }
}

/// Reports each class of callback failure once.
///
/// A class is the failing stage plus the query reason. The row, column and
/// message do not matter: one broken callback fails for every row it is asked
/// about, often with the row baked into its message. Only the first message
/// of a class is logged.
#[derive(Default)]
pub struct FailureReporter {
    seen: Mutex<HashSet<(CallbackStage, QueryReason)>>,
    hook: Option<FailureHook>,
    suppressed: AtomicUsize,
}

impl FailureReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the hook invoked for first occurrences.
    pub fn set_hook(&mut self, hook: Option<FailureHook>) {
        self.hook = hook;
    }

    /// Reports `failure`. Returns `true` if this was its first occurrence.
    pub fn report(&self, failure: &CallbackFailure) -> bool {
        let first = self
            .seen
            .lock()
            .insert((failure.stage, failure.reason));

        if first {
            tracing::error!(
                target: targets::FAILURES,
                stage = %failure.stage,
                row = failure.row,
                column = ?failure.column,
                reason = ?failure.reason,
                "attribute callback failed: {}",
                failure.message
            );
            if let Some(hook) = &self.hook {
                hook(failure);
            }
        } else {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(
                target: targets::FAILURES,
                stage = %failure.stage,
                row = failure.row,
                "repeated callback failure suppressed"
            );
        }
        first
    }

    /// Number of failure classes reported.
    pub fn reported_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Number of repeated failures that were suppressed.
    pub fn suppressed_count(&self) -> usize {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// Forgets all reported failures.
    pub fn reset(&self) {
        self.seen.lock().clear();
        self.suppressed.store(0, Ordering::Relaxed);
    }
}

impl fmt::Debug for FailureReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureReporter")
            .field("reported", &self.reported_count())
            .field("suppressed", &self.suppressed_count())
            .field("has_hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(stage: CallbackStage, row: usize, message: &str) -> CallbackFailure {
        failure_for(stage, row, QueryReason::Display, message)
    }

    fn failure_for(
        stage: CallbackStage,
        row: usize,
        reason: QueryReason,
        message: &str,
    ) -> CallbackFailure {
        let error: CallbackError = message.into();
        CallbackFailure::new(stage, row, None, reason, &error)
    }

    #[test]
    fn one_report_per_stage_and_reason() {
        let reporter = FailureReporter::new();
        assert!(reporter.report(&failure(CallbackStage::Row, 0, "boom")));
        assert!(!reporter.report(&failure(CallbackStage::Row, 1, "boom")));
        assert!(!reporter.report(&failure(CallbackStage::Row, 1, "other")));
        assert!(reporter.report(&failure(CallbackStage::Cell, 1, "boom")));
        assert!(reporter.report(&failure_for(
            CallbackStage::Row,
            1,
            QueryReason::Tooltip,
            "boom"
        )));

        assert_eq!(reporter.reported_count(), 3);
        assert_eq!(reporter.suppressed_count(), 2);

        reporter.reset();
        assert!(reporter.report(&failure(CallbackStage::Row, 0, "boom")));
    }

    #[test]
    fn row_specific_messages_share_a_class() {
        let reporter = FailureReporter::new();
        let first = (0..50)
            .filter(|&row| {
                reporter.report(&failure(
                    CallbackStage::Row,
                    row,
                    &format!("lookup failed for row {row}"),
                ))
            })
            .count();

        assert_eq!(first, 1);
        assert_eq!(reporter.reported_count(), 1);
        assert_eq!(reporter.suppressed_count(), 49);
    }

    #[test]
    fn hook_sees_first_occurrence_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let mut reporter = FailureReporter::new();
        reporter.set_hook(Some(Arc::new(move |_failure: &CallbackFailure| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        for row in 0..5 {
            reporter.report(&failure(CallbackStage::Cell, row, "bad format"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failure_converts_to_error() {
        let err = failure(CallbackStage::Cell, 0, "bad").to_error();
        assert_eq!(err.to_string(), "cell callback failed: bad");
    }
}
