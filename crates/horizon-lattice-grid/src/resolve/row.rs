//! Row attribute context.

use std::sync::Arc;

use crate::column::ColumnSet;
use crate::error::{GridError, Result};
use crate::message::{append_line, GridMessage, MessageAggregator};
use crate::types::{BorderStyle, Borders, ColorCategory, IconRef, QueryReason, SeverityKind};

/// The attributes computed for one row and one query reason.
///
/// The resolver owns a single instance and re-initializes it for every row
/// query; the row callback receives it mutably. Everything set here is shared
/// by all cells of the row, and the column-keyed messages drive cell color
/// escalation.
///
/// # Example
///
/// ```ignore
/// resolver.set_row_callback(|row| {
///     if row.row() == 3 {
///         row.add_error("Amount must be positive", "amount");
///     }
///     Ok(())
/// });
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RowAttributeContext {
    row: usize,
    reason: QueryReason,
    initialized: bool,
    color_category: ColorCategory,
    grayed: Option<bool>,
    borders: Borders,
    read_only: bool,
    read_only_message: String,
    severity: SeverityKind,
    icon: Option<IconRef>,
    tooltip_text: String,
    row_id_text: Option<String>,
    content_visible: bool,
    indent_level: u32,
    messages: MessageAggregator,
    columns: Arc<ColumnSet>,
}

impl RowAttributeContext {
    /// Creates an uninitialized context over `columns`.
    pub fn new(columns: Arc<ColumnSet>) -> Self {
        Self {
            row: 0,
            reason: QueryReason::Display,
            initialized: false,
            color_category: ColorCategory::Normal,
            grayed: None,
            borders: Borders::default(),
            read_only: false,
            read_only_message: String::new(),
            severity: SeverityKind::None,
            icon: None,
            tooltip_text: String::new(),
            row_id_text: None,
            content_visible: true,
            indent_level: 0,
            messages: MessageAggregator::new(),
            columns,
        }
    }

    /// Resets every attribute to the defaults for `row` and `reason`.
    ///
    /// Odd rows start in [`ColorCategory::Alternate`] when `alternate_rows` is
    /// on. String buffers and message queues keep their allocations.
    pub fn initialize(
        &mut self,
        row: usize,
        reason: QueryReason,
        alternate_rows: bool,
        read_only_message: &str,
    ) {
        self.row = row;
        self.reason = reason;
        self.initialized = true;
        self.color_category = if alternate_rows && row % 2 == 1 {
            ColorCategory::Alternate
        } else {
            ColorCategory::Normal
        };
        self.grayed = None;
        self.borders = Borders::default();
        self.read_only = false;
        self.read_only_message.clear();
        self.read_only_message.push_str(read_only_message);
        self.severity = SeverityKind::None;
        self.icon = None;
        self.tooltip_text.clear();
        self.row_id_text = None;
        self.content_visible = true;
        self.indent_level = 0;
        self.messages.clear();
    }

    /// Drops the row identity so that cells cannot resolve against it.
    pub(crate) fn invalidate(&mut self) {
        self.initialized = false;
        self.messages.clear();
    }

    pub(crate) fn set_columns(&mut self, columns: Arc<ColumnSet>) {
        self.columns = columns;
    }

    /// Index of the row being resolved.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Why the row is being resolved.
    pub fn reason(&self) -> QueryReason {
        self.reason
    }

    /// Returns `true` once [`initialize`](Self::initialize) has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The columns messages are routed against.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    // -------------------------------------------------------------------------
    // Color and borders
    // -------------------------------------------------------------------------

    /// The row color category.
    pub fn color_category(&self) -> ColorCategory {
        self.color_category
    }

    /// Sets the color category.
    ///
    /// [`ColorCategory::TotalRow`] also sets the top and bottom borders to
    /// [`BorderStyle::Thick`]. Use [`set_color_category_only`](Self::set_color_category_only)
    /// to leave the borders alone.
    pub fn set_color_category(&mut self, category: ColorCategory) {
        self.color_category = category;
        if category == ColorCategory::TotalRow {
            self.borders.top = BorderStyle::Thick;
            self.borders.bottom = BorderStyle::Thick;
        }
    }

    /// Sets the color category without border side effects.
    pub fn set_color_category_only(&mut self, category: ColorCategory) {
        self.color_category = category;
    }

    /// The row borders.
    pub fn borders(&self) -> &Borders {
        &self.borders
    }

    /// Mutable access to the row borders.
    pub fn borders_mut(&mut self) -> &mut Borders {
        &mut self.borders
    }

    /// Sets the top border.
    pub fn set_top_border(&mut self, style: BorderStyle) {
        self.borders.top = style;
    }

    /// Sets the bottom border.
    pub fn set_bottom_border(&mut self, style: BorderStyle) {
        self.borders.bottom = style;
    }

    /// Sets the left border, used by cells whose column leaves it unspecified.
    pub fn set_left_border(&mut self, style: BorderStyle) {
        self.borders.left = style;
    }

    /// Sets the right border, used by cells whose column leaves it unspecified.
    pub fn set_right_border(&mut self, style: BorderStyle) {
        self.borders.right = style;
    }

    /// Sets the diagonal strikes.
    pub fn set_diagonals(&mut self, up: bool, down: bool) {
        self.borders.diagonal_up = up;
        self.borders.diagonal_down = down;
    }

    /// Explicit grayed override; `None` lets each column decide.
    pub fn grayed(&self) -> Option<bool> {
        self.grayed
    }

    /// Overrides the grayed state of every cell in the row.
    pub fn set_grayed(&mut self, grayed: bool) {
        self.grayed = Some(grayed);
    }

    /// Removes the grayed override so column defaults apply.
    pub fn clear_grayed(&mut self) {
        self.grayed = None;
    }

    // -------------------------------------------------------------------------
    // Read-only state
    // -------------------------------------------------------------------------

    /// Whether every cell of the row is read-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Message shown when an edit is refused.
    pub fn read_only_message(&self) -> &str {
        &self.read_only_message
    }

    /// Marks the whole row read-only. Cells of a read-only row are read-only
    /// regardless of their column configuration.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Sets the message shown when an edit is refused.
    pub fn set_read_only_message(&mut self, message: impl Into<String>) {
        self.read_only_message = message.into();
    }

    // -------------------------------------------------------------------------
    // Severity, icon, and tooltip
    // -------------------------------------------------------------------------

    /// The worst severity reported for the row.
    pub fn severity(&self) -> SeverityKind {
        self.severity
    }

    /// Raises the row severity to `severity` if it is more severe.
    pub fn escalate_severity(&mut self, severity: SeverityKind) {
        self.severity = self.severity.escalate(severity);
    }

    /// [`escalate_severity`](Self::escalate_severity) for an untyped value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidArgument`] for an unknown severity value.
    pub fn escalate_severity_value(&mut self, value: i32) -> Result<()> {
        let severity = SeverityKind::try_from(value)?;
        self.escalate_severity(severity);
        Ok(())
    }

    /// A user-supplied icon drawn instead of the severity icon.
    pub fn icon(&self) -> Option<&IconRef> {
        self.icon.as_ref()
    }

    /// Sets or clears the row icon.
    pub fn set_icon(&mut self, icon: Option<IconRef>) {
        self.icon = icon;
    }

    /// The row tooltip.
    pub fn tooltip_text(&self) -> &str {
        &self.tooltip_text
    }

    /// Replaces the row tooltip.
    pub fn set_tooltip_text(&mut self, text: impl Into<String>) {
        self.tooltip_text = text.into();
    }

    /// Appends a line to the tooltip text.
    pub fn append_tooltip(&mut self, line: &str) {
        append_line(&mut self.tooltip_text, line);
    }

    // -------------------------------------------------------------------------
    // Identification and content
    // -------------------------------------------------------------------------

    /// The explicit row identifier, if the callback set one.
    ///
    /// When unset, the resolver falls back to the source key or a positional
    /// label when it needs one.
    pub fn row_id_text(&self) -> Option<&str> {
        self.row_id_text.as_deref()
    }

    /// Sets the identifier used to prefix this row's messages.
    pub fn set_row_id_text(&mut self, text: impl Into<String>) {
        self.row_id_text = Some(text.into());
    }

    /// Whether check boxes, buttons, and choices are shown in this row.
    pub fn content_visible(&self) -> bool {
        self.content_visible
    }

    /// Shows or hides the content of interactive cells in the row.
    pub fn set_content_visible(&mut self, visible: bool) {
        self.content_visible = visible;
    }

    /// Indentation level of the row.
    pub fn indent_level(&self) -> u32 {
        self.indent_level
    }

    /// Sets the indentation level inherited by the row's cells.
    pub fn set_indent_level(&mut self, level: u32) {
        self.indent_level = level;
    }

    // -------------------------------------------------------------------------
    // Messages
    // -------------------------------------------------------------------------

    /// Messages added for the row, by row and by column.
    pub fn messages(&self) -> &MessageAggregator {
        &self.messages
    }

    /// Adds an error. `columns` is a comma-separated list of column names the
    /// message is additionally routed to; it may be empty.
    pub fn add_error(&mut self, text: impl Into<String>, columns: &str) {
        self.push_message(SeverityKind::Error, text.into(), None, columns);
    }

    /// Adds a warning. See [`add_error`](Self::add_error).
    pub fn add_warning(&mut self, text: impl Into<String>, columns: &str) {
        self.push_message(SeverityKind::Warning, text.into(), None, columns);
    }

    /// Adds an informational message. See [`add_error`](Self::add_error).
    pub fn add_info(&mut self, text: impl Into<String>, columns: &str) {
        self.push_message(SeverityKind::Info, text.into(), None, columns);
    }

    /// Adds a message with an explicit severity and optional code.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidArgument`] for [`SeverityKind::None`].
    pub fn add_message(
        &mut self,
        severity: SeverityKind,
        text: impl Into<String>,
        code: Option<&str>,
        columns: &str,
    ) -> Result<()> {
        if severity == SeverityKind::None {
            return Err(GridError::invalid_argument(
                "severity",
                "a message needs a severity above None",
            ));
        }
        self.push_message(severity, text.into(), code, columns);
        Ok(())
    }

    /// [`add_message`](Self::add_message) for an untyped severity value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidArgument`] for unknown values and for `None`.
    pub fn add_message_value(
        &mut self,
        severity: i32,
        text: impl Into<String>,
        code: Option<&str>,
        columns: &str,
    ) -> Result<()> {
        self.add_message(SeverityKind::try_from(severity)?, text, code, columns)
    }

    fn push_message(&mut self, severity: SeverityKind, text: String, code: Option<&str>, columns: &str) {
        self.escalate_severity(severity);
        if self.reason.collects_tooltip() {
            append_line(&mut self.tooltip_text, &text);
        }

        let mut message = GridMessage::new(severity, text, self.row);
        if let Some(code) = code {
            message = message.with_code(code);
        }
        self.messages.add_message(message, columns, &self.columns);
    }
}
