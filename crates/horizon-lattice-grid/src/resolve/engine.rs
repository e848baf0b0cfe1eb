//! The attribute resolution orchestrator.

use std::sync::Arc;
use std::thread::ThreadId;

use parking_lot::Mutex;

use super::cell::CellAttributeContext;
use super::report::{
    CallbackFailure, CallbackResult, CallbackStage, FailureHook, FailureReporter,
};
use super::row::RowAttributeContext;
use crate::column::ColumnSet;
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::logging::{span_names, targets};
use crate::message::GridMessage;
use crate::types::{CellValue, QueryReason, SeverityKind};

/// Row data the resolver reads from.
pub trait GridSource: Send + Sync {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// The source value of a cell. Out-of-range positions return `Null`.
    fn cell_value(&self, row: usize, column: usize) -> CellValue;

    /// A stable key identifying the row in messages, if the source has one.
    fn row_key(&self, _row: usize) -> Option<String> {
        None
    }
}

impl GridSource for Vec<Vec<CellValue>> {
    fn row_count(&self) -> usize {
        self.len()
    }

    fn cell_value(&self, row: usize, column: usize) -> CellValue {
        self.get(row)
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or_default()
    }
}

/// Application callback computing row attributes.
pub type RowAttributeCallback =
    Arc<dyn Fn(&mut RowAttributeContext) -> CallbackResult + Send + Sync>;

/// Application callback computing cell attributes.
pub type CellAttributeCallback =
    Arc<dyn Fn(&mut CellAttributeContext) -> CallbackResult + Send + Sync>;

/// Where the resolver is in the two-phase request protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePhase {
    /// Nothing resolved yet, or detached.
    #[default]
    Idle,
    /// The row callback is running.
    RowRequested,
    /// A row context is available for cell queries.
    RowResolved,
    /// The cell callback is running.
    CellRequested,
    /// A cell was resolved; further cells of the same row may follow.
    CellResolved,
}

impl ResolvePhase {
    /// Returns `true` while an application callback is running.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ResolvePhase::RowRequested | ResolvePhase::CellRequested)
    }

    /// Returns `true` if cells may be requested.
    pub fn has_row(&self) -> bool {
        matches!(self, ResolvePhase::RowResolved | ResolvePhase::CellResolved)
    }
}

#[derive(Debug, Default)]
struct ResolveState {
    phase: ResolvePhase,
    row: Option<(usize, QueryReason)>,
    column: Option<usize>,
}

impl ResolveState {
    fn reset(&mut self) {
        *self = ResolveState::default();
    }
}

/// Which stored context answers a request.
enum Entry {
    /// The working context holds the result.
    Current,
    /// The request targets the context whose callback is running; answer
    /// with the snapshot taken before the callback.
    Reentrant,
}

/// Returns the phase to `restore` if a resolution bails out early.
struct PhaseGuard<'a> {
    state: &'a Mutex<ResolveState>,
    restore: ResolvePhase,
    armed: bool,
}

impl<'a> PhaseGuard<'a> {
    fn new(state: &'a Mutex<ResolveState>, restore: ResolvePhase) -> Self {
        Self {
            state,
            restore,
            armed: true,
        }
    }

    fn finish(mut self, phase: ResolvePhase) {
        self.armed = false;
        self.state.lock().phase = phase;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            state.phase = self.restore;
            if self.restore == ResolvePhase::Idle {
                state.row = None;
                state.column = None;
            }
        }
    }
}

/// Computes row and cell presentation attributes on demand.
///
/// The resolver owns one row context and one cell context and re-initializes
/// them for every query. Queries follow a two-phase protocol: a row is
/// resolved first ([`row_info`](Self::row_info)), then any number of its
/// cells ([`cell_info`](Self::cell_info)). The convenience queries compose
/// both phases.
///
/// Contexts are returned as snapshots. Only one resolution is in flight at a
/// time: while a callback runs, a request for the very context being computed
/// is answered with its pre-callback state, and any other request fails with
/// [`GridError::InvalidState`].
///
/// The resolver is meant to be used from the UI thread that created it; debug
/// builds assert this.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_lattice_grid::prelude::*;
///
/// let rows: Vec<Vec<CellValue>> = vec![
///     vec![CellValue::from("Widget"), CellValue::from(-3)],
///     vec![CellValue::from("Gadget"), CellValue::from(12)],
/// ];
/// let columns = ColumnSet::new()
///     .with_column(ColumnSpec::new("name"))
///     .with_column(ColumnSpec::new("amount"));
///
/// let mut resolver = AttributeResolver::new(Arc::new(rows), columns, GridConfig::default());
/// resolver.set_row_callback(|row| {
///     if row.row() == 0 {
///         row.add_error("Amount must be positive", "amount");
///     }
///     Ok(())
/// });
///
/// let row = resolver.row_info(0, QueryReason::Display).unwrap();
/// assert_eq!(row.severity(), SeverityKind::Error);
///
/// let cell = resolver.cell_info(1).unwrap();
/// assert_eq!(cell.color_category(), ColorCategory::Error);
/// ```
pub struct AttributeResolver {
    source: Arc<dyn GridSource>,
    columns: Arc<ColumnSet>,
    config: GridConfig,
    row_callback: Option<RowAttributeCallback>,
    cell_callback: Option<CellAttributeCallback>,
    state: Mutex<ResolveState>,
    row: Mutex<RowAttributeContext>,
    row_seed: Mutex<RowAttributeContext>,
    cell: Mutex<CellAttributeContext>,
    cell_seed: Mutex<CellAttributeContext>,
    failures: FailureReporter,
    thread: ThreadId,
}

static_assertions::assert_impl_all!(AttributeResolver: Send, Sync);

impl AttributeResolver {
    /// Creates a resolver over `source` with no callbacks installed.
    pub fn new(source: Arc<dyn GridSource>, columns: ColumnSet, config: GridConfig) -> Self {
        let columns = Arc::new(columns);
        Self {
            source,
            row: Mutex::new(RowAttributeContext::new(Arc::clone(&columns))),
            row_seed: Mutex::new(RowAttributeContext::new(Arc::clone(&columns))),
            cell: Mutex::new(CellAttributeContext::new()),
            cell_seed: Mutex::new(CellAttributeContext::new()),
            columns,
            config,
            row_callback: None,
            cell_callback: None,
            state: Mutex::new(ResolveState::default()),
            failures: FailureReporter::new(),
            thread: std::thread::current().id(),
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Installs the row attribute callback.
    pub fn set_row_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut RowAttributeContext) -> CallbackResult + Send + Sync + 'static,
    {
        self.row_callback = Some(Arc::new(callback));
    }

    /// Builder form of [`set_row_callback`](Self::set_row_callback).
    pub fn with_row_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut RowAttributeContext) -> CallbackResult + Send + Sync + 'static,
    {
        self.set_row_callback(callback);
        self
    }

    /// Removes the row callback; rows then keep their defaults.
    pub fn clear_row_callback(&mut self) {
        self.row_callback = None;
    }

    /// Installs the cell attribute callback.
    pub fn set_cell_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut CellAttributeContext) -> CallbackResult + Send + Sync + 'static,
    {
        self.cell_callback = Some(Arc::new(callback));
    }

    /// Builder form of [`set_cell_callback`](Self::set_cell_callback).
    pub fn with_cell_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut CellAttributeContext) -> CallbackResult + Send + Sync + 'static,
    {
        self.set_cell_callback(callback);
        self
    }

    /// Removes the cell callback; cells then keep their escalated defaults.
    pub fn clear_cell_callback(&mut self) {
        self.cell_callback = None;
    }

    /// Sets the hook notified of the first occurrence of each callback failure.
    pub fn set_failure_hook(&mut self, hook: Option<FailureHook>) {
        self.failures.set_hook(hook);
    }

    /// Replaces the column set. Resolved contexts are discarded.
    pub fn set_columns(&mut self, columns: ColumnSet) {
        self.columns = Arc::new(columns);
        self.row.get_mut().set_columns(Arc::clone(&self.columns));
        self.row_seed.get_mut().set_columns(Arc::clone(&self.columns));
        self.discard();
    }

    /// Replaces the grid source. Resolved contexts are discarded.
    pub fn set_source(&mut self, source: Arc<dyn GridSource>) {
        self.source = source;
        self.discard();
    }

    /// The column set cells are resolved against.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// The view configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Mutable access to the view configuration.
    pub fn config_mut(&mut self) -> &mut GridConfig {
        &mut self.config
    }

    /// The reporter that records callback failures.
    pub fn failures(&self) -> &FailureReporter {
        &self.failures
    }

    /// Binds the resolver to the calling thread.
    pub fn rebind_thread(&mut self) {
        self.thread = std::thread::current().id();
    }

    /// Current protocol phase.
    pub fn phase(&self) -> ResolvePhase {
        self.state.lock().phase
    }

    /// Resets both contexts, the phase, and the failure history, as when the
    /// owning view is detached.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidState`] when called from a callback.
    pub fn detach(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.phase.is_in_flight() {
                return Err(GridError::invalid_state(
                    "detach",
                    "a resolution callback is running",
                ));
            }
            state.reset();
        }
        self.row.lock().invalidate();
        self.cell.lock().invalidate();
        self.failures.reset();
        tracing::debug!(target: targets::RESOLVE, "resolver detached");
        Ok(())
    }

    fn discard(&mut self) {
        self.state.get_mut().reset();
        self.row.get_mut().invalidate();
        self.cell.get_mut().invalidate();
    }

    // =========================================================================
    // Two-phase protocol
    // =========================================================================

    /// Resolves the attributes of `row` for `reason`.
    ///
    /// Must precede [`cell_info`](Self::cell_info) for the cells of that row.
    ///
    /// Called from the row callback for the row being resolved, this returns
    /// the context as it was before the callback ran, without anything the
    /// callback has written so far. The callback's own `&mut` context is the
    /// up-to-date one.
    ///
    /// # Errors
    ///
    /// [`GridError::RowOutOfRange`] for a row past the end of the source and
    /// [`GridError::InvalidState`] while another resolution is in flight.
    pub fn row_info(&self, row: usize, reason: QueryReason) -> Result<RowAttributeContext> {
        self.with_row(row, reason, RowAttributeContext::clone)
    }

    /// Resolves the attributes of `column` in the most recently resolved row.
    ///
    /// Several columns may be queried in sequence for one row.
    ///
    /// Called from the cell callback for the cell being resolved, this returns
    /// the seeded context from before the callback ran. Read the callback's
    /// own writes from the `&mut` context it was given.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidState`] when no row has been resolved or another
    /// resolution is in flight, [`GridError::ColumnOutOfRange`] for an unknown
    /// column.
    pub fn cell_info(&self, column: usize) -> Result<CellAttributeContext> {
        self.with_cell(column, false, CellAttributeContext::clone)
    }

    fn with_row<R>(
        &self,
        row: usize,
        reason: QueryReason,
        read: impl FnOnce(&RowAttributeContext) -> R,
    ) -> Result<R> {
        match self.resolve_row(row, reason)? {
            Entry::Current => Ok(read(&*self.row.lock())),
            Entry::Reentrant => Ok(read(&*self.row_seed.lock())),
        }
    }

    fn with_cell<R>(
        &self,
        column: usize,
        seed_value_tooltip: bool,
        read: impl FnOnce(&CellAttributeContext) -> R,
    ) -> Result<R> {
        match self.resolve_cell(column, seed_value_tooltip)? {
            Entry::Current => Ok(read(&*self.cell.lock())),
            Entry::Reentrant => Ok(read(&*self.cell_seed.lock())),
        }
    }

    fn resolve_row(&self, row: usize, reason: QueryReason) -> Result<Entry> {
        self.debug_assert_thread();

        let row_count = self.source.row_count();
        if row >= row_count {
            return Err(GridError::RowOutOfRange { row, row_count });
        }

        let restore = {
            let mut state = self.state.lock();
            match state.phase {
                ResolvePhase::RowRequested => {
                    return if state.row == Some((row, reason)) {
                        tracing::trace!(target: targets::RESOLVE, row, "reentrant row request suppressed");
                        Ok(Entry::Reentrant)
                    } else {
                        Err(GridError::invalid_state(
                            "row_info",
                            "another row is being resolved",
                        ))
                    };
                }
                ResolvePhase::CellRequested => {
                    // The row context is complete while a cell callback runs.
                    return if state.row == Some((row, reason)) {
                        Ok(Entry::Current)
                    } else {
                        Err(GridError::invalid_state(
                            "row_info",
                            "a cell of another row is being resolved",
                        ))
                    };
                }
                ResolvePhase::Idle | ResolvePhase::RowResolved | ResolvePhase::CellResolved => {}
            }
            state.phase = ResolvePhase::RowRequested;
            state.row = Some((row, reason));
            state.column = None;
            ResolvePhase::Idle
        };
        let guard = PhaseGuard::new(&self.state, restore);

        let _span =
            tracing::debug_span!(target: targets::RESOLVE, span_names::ROW, row, reason = ?reason)
                .entered();

        {
            let mut ctx = self.row.lock();
            ctx.initialize(
                row,
                reason,
                self.config.alternate_rows(),
                self.config.read_only_message(),
            );

            self.notify_row_callback(&mut ctx);
        }

        guard.finish(ResolvePhase::RowResolved);
        Ok(Entry::Current)
    }

    fn resolve_cell(&self, column: usize, seed_value_tooltip: bool) -> Result<Entry> {
        self.debug_assert_thread();

        let column_count = self.columns.len();
        if column >= column_count {
            return Err(GridError::ColumnOutOfRange {
                column,
                column_count,
            });
        }

        let (row, reason, restore) = {
            let mut state = self.state.lock();
            let restore = match state.phase {
                ResolvePhase::Idle => {
                    return Err(GridError::invalid_state(
                        "cell_info",
                        "no row has been resolved",
                    ));
                }
                ResolvePhase::RowRequested => {
                    return Err(GridError::invalid_state(
                        "cell_info",
                        "the row callback is still running",
                    ));
                }
                ResolvePhase::CellRequested => {
                    return if state.column == Some(column) {
                        tracing::trace!(target: targets::RESOLVE, column, "reentrant cell request suppressed");
                        Ok(Entry::Reentrant)
                    } else {
                        Err(GridError::invalid_state(
                            "cell_info",
                            "another cell is being resolved",
                        ))
                    };
                }
                phase @ (ResolvePhase::RowResolved | ResolvePhase::CellResolved) => phase,
            };
            let Some((row, reason)) = state.row else {
                return Err(GridError::invalid_state(
                    "cell_info",
                    "no row has been resolved",
                ));
            };
            state.phase = ResolvePhase::CellRequested;
            state.column = Some(column);
            (row, reason, restore)
        };
        let guard = PhaseGuard::new(&self.state, restore);

        let _span = tracing::debug_span!(
            target: targets::RESOLVE,
            span_names::CELL,
            row,
            column,
            reason = ?reason
        )
        .entered();

        let spec = self.columns.get(column).ok_or(GridError::ColumnOutOfRange {
            column,
            column_count,
        })?;
        let original = self.source.cell_value(row, column);

        {
            let mut ctx = self.cell.lock();
            ctx.initialize(
                &*self.row.lock(),
                column,
                spec,
                original,
                self.config.read_only_message(),
            )?;
            if seed_value_tooltip {
                ctx.seed_value_tooltip();
            }

            self.notify_cell_callback(&mut ctx);
        }

        guard.finish(ResolvePhase::CellResolved);
        Ok(Entry::Current)
    }

    /// Runs the row callback on `ctx`, or leaves the defaults when none is set.
    ///
    /// On failure `ctx` is restored to its state before the callback.
    fn notify_row_callback(&self, ctx: &mut RowAttributeContext) {
        let Some(callback) = &self.row_callback else {
            return;
        };
        self.row_seed.lock().clone_from(ctx);
        if let Err(error) = callback(&mut *ctx) {
            let failure =
                CallbackFailure::new(CallbackStage::Row, ctx.row(), None, ctx.reason(), &error);
            self.failures.report(&failure);
            ctx.clone_from(&*self.row_seed.lock());
        }
    }

    /// Runs the cell callback on `ctx`, or leaves the escalated defaults when
    /// none is set.
    fn notify_cell_callback(&self, ctx: &mut CellAttributeContext) {
        let Some(callback) = &self.cell_callback else {
            return;
        };
        self.cell_seed.lock().clone_from(ctx);
        if let Err(error) = callback(&mut *ctx) {
            let failure = CallbackFailure::new(
                CallbackStage::Cell,
                ctx.row(),
                Some(ctx.column()),
                ctx.reason(),
                &error,
            );
            self.failures.report(&failure);
            ctx.clone_from(&*self.cell_seed.lock());
        }
    }

    fn debug_assert_thread(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.thread,
            "AttributeResolver used from a thread other than the one it is bound to"
        );
    }

    // =========================================================================
    // Convenience queries
    // =========================================================================

    /// Whether a cell may be edited, with the explanation to show if not.
    ///
    /// A read-only view answers without invoking any callback.
    ///
    /// # Errors
    ///
    /// [`GridError::RowOutOfRange`] and [`GridError::ColumnOutOfRange`] for
    /// positions outside the grid, read-only view or not.
    pub fn cell_read_only(&self, row: usize, column: usize) -> Result<(bool, String)> {
        self.check_position(row, column)?;
        if self.config.is_read_only() {
            return Ok((true, self.config.view_read_only_message().to_string()));
        }
        self.with_row(row, QueryReason::ReadOnlyCheck, |_| ())?;
        self.with_cell(column, false, |cell| {
            (cell.is_read_only(), cell.read_only_message().to_string())
        })
    }

    fn check_position(&self, row: usize, column: usize) -> Result<()> {
        let row_count = self.source.row_count();
        if row >= row_count {
            return Err(GridError::RowOutOfRange { row, row_count });
        }
        let column_count = self.columns.len();
        if column >= column_count {
            return Err(GridError::ColumnOutOfRange {
                column,
                column_count,
            });
        }
        Ok(())
    }

    /// The tooltip text of a cell.
    ///
    /// The tooltip is seeded with the row tooltip, or the value text when the
    /// row has none, before the cell callback runs. Hidden content yields an
    /// empty string unless the callback set a tooltip explicitly.
    pub fn cell_tooltip(&self, row: usize, column: usize) -> Result<String> {
        self.with_row(row, QueryReason::Tooltip, |_| ())?;
        self.with_cell(column, true, |cell| cell.visible_tooltip().to_string())
    }

    /// The tooltip text of a row, including its diagnostic messages.
    pub fn row_tooltip(&self, row: usize) -> Result<String> {
        self.with_row(row, QueryReason::Tooltip, |ctx| ctx.tooltip_text().to_string())
    }

    /// The identifier used to prefix messages of `row`.
    fn row_id(&self, ctx: &RowAttributeContext) -> String {
        match ctx.row_id_text() {
            Some(text) => text.to_string(),
            None => self
                .source
                .row_key(ctx.row())
                .unwrap_or_else(|| format!("{} {}", self.config.row_label(), ctx.row() + 1)),
        }
    }

    /// Appends the messages of `row` to `out`, optionally prefixed with the
    /// row identifier.
    pub fn collect_row_messages(
        &self,
        out: &mut Vec<GridMessage>,
        row: usize,
        use_row_id_prefix: bool,
    ) -> Result<()> {
        self.with_row(row, QueryReason::Display, |ctx| {
            let row_id = use_row_id_prefix.then(|| self.row_id(ctx));
            ctx.messages().collect_for_row(
                row,
                ctx.severity(),
                ctx.tooltip_text(),
                self.config.no_message_text(),
                row_id.as_deref(),
                out,
            );
        })
    }

    /// Appends the messages of every row in `selected`. Messages are prefixed
    /// with their row identifier when more than one row is selected.
    pub fn collect_selected_rows_messages(
        &self,
        out: &mut Vec<GridMessage>,
        selected: &[usize],
    ) -> Result<()> {
        let use_prefix = selected.len() > 1;
        for &row in selected {
            self.collect_row_messages(out, row, use_prefix)?;
        }
        Ok(())
    }

    /// Appends the messages of every row. Messages are prefixed with their row
    /// identifier when the table has more than one row.
    pub fn collect_all_rows_messages(&self, out: &mut Vec<GridMessage>) -> Result<()> {
        let row_count = self.source.row_count();
        let use_prefix = row_count > 1;
        for row in 0..row_count {
            self.collect_row_messages(out, row, use_prefix)?;
        }
        Ok(())
    }

    /// Finds the next row whose severity matches `threshold`.
    ///
    /// The scan starts after `start` (exclusive) and runs toward the end when
    /// `forward`, else toward the start. `None` starts before the first row
    /// (forward) or after the last row (backward). A `start` past the end of
    /// the table finds nothing.
    pub fn find_severity_row(
        &self,
        start: Option<usize>,
        forward: bool,
        threshold: SeverityKind,
    ) -> Result<Option<usize>> {
        let row_count = self.source.row_count();
        if start.is_some_and(|s| s >= row_count) {
            tracing::trace!(target: targets::RESOLVE, ?start, row_count, "severity scan start out of range");
            return Ok(None);
        }

        let candidates: Box<dyn Iterator<Item = usize>> = if forward {
            Box::new(start.map_or(0, |s| s + 1)..row_count)
        } else {
            Box::new((0..start.unwrap_or(row_count)).rev())
        };

        for row in candidates {
            let severity = self.with_row(row, QueryReason::Display, |ctx| ctx.severity())?;
            if severity.matches_threshold(threshold) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// The worst row severity in the table.
    pub fn worst_severity_over_table(&self) -> Result<SeverityKind> {
        let mut worst = SeverityKind::None;
        for row in 0..self.source.row_count() {
            worst = worst.escalate(self.with_row(row, QueryReason::Display, |ctx| ctx.severity())?);
            if worst == SeverityKind::Error {
                break;
            }
        }
        Ok(worst)
    }
}

impl std::fmt::Debug for AttributeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeResolver")
            .field("rows", &self.source.row_count())
            .field("columns", &self.columns.len())
            .field("phase", &self.phase())
            .field("has_row_callback", &self.row_callback.is_some())
            .field("has_cell_callback", &self.cell_callback.is_some())
            .field("failures", &self.failures)
            .finish()
    }
}
