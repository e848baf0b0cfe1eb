//! Cell attribute context.

use std::sync::Arc;

use super::row::RowAttributeContext;
use crate::column::ColumnSpec;
use crate::error::{GridError, Result};
use crate::message::GridMessage;
use crate::types::{
    BorderStyle, Borders, CellStyle, CellValue, ColorCategory, ColumnKind, QueryReason,
    SeverityKind,
};

/// The attributes computed for one cell and one query reason.
///
/// A cell context is always derived from the row context of the same row and
/// reason: the row supplies the base color, grayed state, borders, read-only
/// state, and the messages routed to this column; the column supplies its
/// minimum category, default grayed state, side borders, and style. The cell
/// callback then sees the escalated result and may adjust any of it.
#[derive(Debug, Clone, PartialEq)]
pub struct CellAttributeContext {
    row: usize,
    column: usize,
    reason: QueryReason,
    initialized: bool,
    column_kind: ColumnKind,
    color_category: ColorCategory,
    grayed: Option<bool>,
    borders: Borders,
    severity: SeverityKind,
    messages: Vec<GridMessage>,
    value: CellValue,
    original_value: CellValue,
    formatting_applied: bool,
    indent_level: u32,
    row_content_visible: bool,
    content_visible: Option<bool>,
    read_only: bool,
    read_only_message: String,
    tooltip_text: String,
    tooltip_explicit: bool,
    style: Arc<CellStyle>,
    style_is_template: bool,
}

impl Default for CellAttributeContext {
    fn default() -> Self {
        Self {
            row: 0,
            column: 0,
            reason: QueryReason::Display,
            initialized: false,
            column_kind: ColumnKind::Text,
            color_category: ColorCategory::Normal,
            grayed: None,
            borders: Borders::default(),
            severity: SeverityKind::None,
            messages: Vec::new(),
            value: CellValue::Null,
            original_value: CellValue::Null,
            formatting_applied: false,
            indent_level: 0,
            row_content_visible: true,
            content_visible: None,
            read_only: false,
            read_only_message: String::new(),
            tooltip_text: String::new(),
            tooltip_explicit: false,
            style: Arc::new(CellStyle::default()),
            style_is_template: true,
        }
    }
}

impl CellAttributeContext {
    /// Creates an uninitialized cell context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the cell attributes for `column` from `row` and `spec`.
    ///
    /// - color: `max(row, column minimum)`, then an `Error` message forces
    ///   `Error` and a `Warning` message forces `Warning` unless already `Error`
    /// - grayed: row override, else column default
    /// - borders: top, bottom and diagonals from the row; left and right from
    ///   the column unless `Default`
    /// - read-only: a read-only row wins over the column
    /// - tooltip: the row tooltip for [`QueryReason::Tooltip`]
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidState`] if `row` was never initialized.
    pub fn initialize(
        &mut self,
        row: &RowAttributeContext,
        column: usize,
        spec: &ColumnSpec,
        original_value: CellValue,
        default_read_only_message: &str,
    ) -> Result<()> {
        if !row.is_initialized() {
            return Err(GridError::invalid_state(
                "cell_info",
                "the row context has not been initialized",
            ));
        }

        self.row = row.row();
        self.column = column;
        self.reason = row.reason();
        self.initialized = true;
        self.column_kind = spec.kind();

        self.messages.clear();
        self.messages
            .extend_from_slice(row.messages().messages_for(column));
        self.severity = row.messages().worst_for(column);

        self.color_category = row.color_category().max(spec.minimum_category());
        // A routed warning never downgrades an error category.
        if self.color_category != ColorCategory::Error {
            if let Some(category) = self.severity.color_category() {
                self.color_category = category;
            }
        }

        self.grayed = row.grayed().or(spec.default_grayed());

        let row_borders = row.borders();
        self.borders = Borders {
            left: spec.left_border().or(row_borders.left),
            top: row_borders.top,
            right: spec.right_border().or(row_borders.right),
            bottom: row_borders.bottom,
            diagonal_up: row_borders.diagonal_up,
            diagonal_down: row_borders.diagonal_down,
        };

        self.value = CellValue::Null;
        self.original_value = original_value;
        self.formatting_applied = false;
        self.indent_level = row.indent_level();
        self.row_content_visible = row.content_visible();
        self.content_visible = None;

        self.read_only_message.clear();
        if row.is_read_only() {
            self.read_only = true;
            self.read_only_message.push_str(row.read_only_message());
        } else {
            self.read_only = spec.is_read_only();
            self.read_only_message
                .push_str(spec.read_only_message().unwrap_or(default_read_only_message));
        }

        self.tooltip_text.clear();
        self.tooltip_explicit = false;
        if self.reason == QueryReason::Tooltip {
            self.tooltip_text.push_str(row.tooltip_text());
        }

        self.style_is_template = spec.style_is_template();
        self.style = if self.style_is_template {
            Arc::clone(spec.style())
        } else {
            Arc::new(CellStyle::clone(spec.style()))
        };

        Ok(())
    }

    /// Uses the value text as tooltip when nothing else seeded it.
    pub(crate) fn seed_value_tooltip(&mut self) {
        if !self.tooltip_text.is_empty() {
            return;
        }
        let text = self.formatted_value().display_text().map(|t| t.into_owned());
        if let Some(text) = text {
            self.tooltip_text = text;
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.initialized = false;
    }

    /// Index of the row the cell belongs to.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Index of the cell's column.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Why the cell is being resolved.
    pub fn reason(&self) -> QueryReason {
        self.reason
    }

    /// Returns `true` once the context was initialized for a cell.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Kind of the cell's column.
    pub fn column_kind(&self) -> ColumnKind {
        self.column_kind
    }

    // -------------------------------------------------------------------------
    // Color, borders, severity
    // -------------------------------------------------------------------------

    /// The cell color category.
    pub fn color_category(&self) -> ColorCategory {
        self.color_category
    }

    /// Sets the color category. Unlike the row setter, this never changes borders.
    pub fn set_color_category(&mut self, category: ColorCategory) {
        self.color_category = category;
    }

    /// The explicit grayed state, `None` when neither row nor column set one.
    pub fn grayed(&self) -> Option<bool> {
        self.grayed
    }

    /// Returns `true` if the cell is grayed.
    pub fn is_grayed(&self) -> bool {
        self.grayed.unwrap_or(false)
    }

    /// Overrides the grayed state.
    pub fn set_grayed(&mut self, grayed: bool) {
        self.grayed = Some(grayed);
    }

    /// The cell borders as resolved, including unspecified sides.
    pub fn borders(&self) -> &Borders {
        &self.borders
    }

    /// Mutable access to the cell borders.
    pub fn borders_mut(&mut self) -> &mut Borders {
        &mut self.borders
    }

    /// The borders to draw for this query's reason.
    pub fn drawn_borders(&self) -> Borders {
        self.borders.for_reason(self.reason)
    }

    /// Sets the left border.
    pub fn set_left_border(&mut self, style: BorderStyle) {
        self.borders.left = style;
    }

    /// Sets the right border.
    pub fn set_right_border(&mut self, style: BorderStyle) {
        self.borders.right = style;
    }

    /// The worst severity among the messages routed to this column.
    pub fn severity(&self) -> SeverityKind {
        self.severity
    }

    /// Messages routed to this column by the row callback.
    pub fn messages(&self) -> &[GridMessage] {
        &self.messages
    }

    // -------------------------------------------------------------------------
    // Values
    // -------------------------------------------------------------------------

    /// The value set by the cell callback.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// Sets the value without marking formatting as applied.
    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        self.value = value.into();
    }

    /// The value from the grid source.
    pub fn original_value(&self) -> &CellValue {
        &self.original_value
    }

    /// Whether `value` holds the formatted value.
    pub fn formatting_applied(&self) -> bool {
        self.formatting_applied
    }

    /// Marks whether `value` holds the formatted value.
    pub fn set_formatting_applied(&mut self, applied: bool) {
        self.formatting_applied = applied;
    }

    /// Sets the value and marks formatting as applied.
    pub fn set_formatted_value(&mut self, value: impl Into<CellValue>) {
        self.value = value.into();
        self.formatting_applied = true;
    }

    /// The value to show.
    ///
    /// `value` when formatting was applied, otherwise `original_value` unless
    /// it is null-like, in which case `value`.
    pub fn formatted_value(&self) -> &CellValue {
        if self.formatting_applied || self.original_value.is_null_like() {
            &self.value
        } else {
            &self.original_value
        }
    }

    /// Indentation level of the cell.
    pub fn indent_level(&self) -> u32 {
        self.indent_level
    }

    /// Sets the indentation level.
    pub fn set_indent_level(&mut self, level: u32) {
        self.indent_level = level;
    }

    // -------------------------------------------------------------------------
    // Content visibility, read-only, tooltip
    // -------------------------------------------------------------------------

    /// Whether the cell content is drawn.
    ///
    /// Check box, button, and choice cells are hidden when their row disabled
    /// content visibility, unless the cell callback set visibility explicitly.
    pub fn content_visible(&self) -> bool {
        self.content_visible
            .unwrap_or(self.row_content_visible || !self.column_kind.is_interactive())
    }

    /// Shows or hides the cell content, overriding the row.
    pub fn set_content_visible(&mut self, visible: bool) {
        self.content_visible = Some(visible);
    }

    /// Whether the cell refuses edits.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Message shown when an edit is refused.
    pub fn read_only_message(&self) -> &str {
        &self.read_only_message
    }

    /// Sets whether the cell refuses edits.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Sets the message shown when an edit is refused.
    pub fn set_read_only_message(&mut self, message: impl Into<String>) {
        self.read_only_message = message.into();
    }

    /// The tooltip text, regardless of content visibility.
    pub fn tooltip_text(&self) -> &str {
        &self.tooltip_text
    }

    /// Sets the tooltip. An explicit tooltip is shown even for hidden content.
    pub fn set_tooltip_text(&mut self, text: impl Into<String>) {
        self.tooltip_text = text.into();
        self.tooltip_explicit = true;
    }

    /// Returns `true` if the cell callback set the tooltip.
    pub fn tooltip_is_explicit(&self) -> bool {
        self.tooltip_explicit
    }

    /// The tooltip to show: empty for hidden content without an explicit tooltip.
    pub fn visible_tooltip(&self) -> &str {
        if self.content_visible() || self.tooltip_explicit {
            &self.tooltip_text
        } else {
            ""
        }
    }

    // -------------------------------------------------------------------------
    // Style
    // -------------------------------------------------------------------------

    /// The cell style.
    pub fn style(&self) -> &CellStyle {
        &self.style
    }

    /// Returns `true` while the style is still the column's shared template.
    pub fn style_is_template(&self) -> bool {
        self.style_is_template
    }

    /// Mutable access to the style. A shared template is copied first.
    pub fn style_mut(&mut self) -> &mut CellStyle {
        self.style_is_template = false;
        Arc::make_mut(&mut self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnSet;
    use crate::types::HorizontalAlignment;

    fn row_context(reason: QueryReason) -> RowAttributeContext {
        let columns = ColumnSet::new()
            .with_column(ColumnSpec::new("a"))
            .with_column(ColumnSpec::new("b"));
        let mut row = RowAttributeContext::new(Arc::new(columns));
        row.initialize(0, reason, false, "default");
        row
    }

    fn resolve(row: &RowAttributeContext, column: usize, spec: &ColumnSpec) -> CellAttributeContext {
        let mut cell = CellAttributeContext::new();
        cell.initialize(row, column, spec, CellValue::Null, "default")
            .unwrap();
        cell
    }

    #[test]
    fn requires_initialized_row() {
        let row = RowAttributeContext::new(Arc::new(ColumnSet::new()));
        let mut cell = CellAttributeContext::new();
        let err = cell
            .initialize(&row, 0, &ColumnSpec::new("a"), CellValue::Null, "")
            .unwrap_err();
        assert!(matches!(err, GridError::InvalidState { .. }));
    }

    #[test]
    fn category_never_below_row_or_column() {
        for row_cat in ColorCategory::ALL {
            for col_cat in ColorCategory::ALL {
                let mut row = row_context(QueryReason::Display);
                row.set_color_category_only(row_cat);
                let spec = ColumnSpec::new("a").with_minimum_category(col_cat);
                let cell = resolve(&row, 0, &spec);
                assert_eq!(cell.color_category(), row_cat.max(col_cat));
            }
        }
    }

    #[test]
    fn messages_escalate_category() {
        let mut row = row_context(QueryReason::Display);
        row.add_warning("w", "a");
        row.add_error("e", "b");
        let spec = ColumnSpec::new("a").with_minimum_category(ColorCategory::Subtotal1);

        let cell = resolve(&row, 0, &spec);
        assert_eq!(cell.color_category(), ColorCategory::Warning);
        assert_eq!(cell.severity(), SeverityKind::Warning);

        let cell = resolve(&row, 1, &ColumnSpec::new("b"));
        assert_eq!(cell.color_category(), ColorCategory::Error);
        assert_eq!(cell.messages().len(), 1);
    }

    #[test]
    fn warning_never_overrides_row_error() {
        let mut row = row_context(QueryReason::Display);
        row.set_color_category(ColorCategory::Error);
        row.add_warning("w", "a");
        let cell = resolve(&row, 0, &ColumnSpec::new("a"));
        assert_eq!(cell.color_category(), ColorCategory::Error);
    }

    #[test]
    fn info_does_not_change_category() {
        let mut row = row_context(QueryReason::Display);
        row.add_info("i", "a");
        let cell = resolve(&row, 0, &ColumnSpec::new("a"));
        assert_eq!(cell.color_category(), ColorCategory::Normal);
        assert_eq!(cell.severity(), SeverityKind::Info);
    }

    #[test]
    fn border_inheritance() {
        let mut row = row_context(QueryReason::Print);
        row.set_left_border(BorderStyle::Default);
        row.set_top_border(BorderStyle::Thick);
        row.set_right_border(BorderStyle::Thin);
        row.set_bottom_border(BorderStyle::Default);
        let spec = ColumnSpec::new("a").with_side_borders(BorderStyle::Thick, BorderStyle::Default);

        let cell = resolve(&row, 0, &spec);
        assert_eq!(cell.borders().left, BorderStyle::Thick);
        assert_eq!(cell.borders().top, BorderStyle::Thick);
        assert_eq!(cell.borders().right, BorderStyle::Thin);
        assert_eq!(cell.borders().bottom, BorderStyle::Default);
    }

    #[test]
    fn cell_total_row_leaves_borders() {
        let row = row_context(QueryReason::Print);
        let mut cell = resolve(&row, 0, &ColumnSpec::new("a"));
        cell.set_color_category(ColorCategory::TotalRow);
        assert_eq!(cell.borders().top, BorderStyle::Default);
        assert_eq!(cell.borders().bottom, BorderStyle::Default);
    }

    #[test]
    fn grayed_precedence() {
        let mut row = row_context(QueryReason::Display);
        let spec = ColumnSpec::new("a").with_default_grayed(true);
        assert_eq!(resolve(&row, 0, &spec).grayed(), Some(true));
        assert_eq!(resolve(&row, 0, &ColumnSpec::new("a")).grayed(), None);

        row.set_grayed(false);
        assert_eq!(resolve(&row, 0, &spec).grayed(), Some(false));
    }

    #[test]
    fn formatted_value_selection() {
        let row = row_context(QueryReason::Display);
        let spec = ColumnSpec::new("a");
        let mut cell = CellAttributeContext::new();

        cell.initialize(&row, 0, &spec, CellValue::from("Z"), "").unwrap();
        cell.set_formatted_value("X");
        assert_eq!(cell.formatted_value(), &CellValue::from("X"));

        cell.initialize(&row, 0, &spec, CellValue::Null, "").unwrap();
        cell.set_value("Y");
        assert_eq!(cell.formatted_value(), &CellValue::from("Y"));

        cell.initialize(&row, 0, &spec, CellValue::from("Z"), "").unwrap();
        cell.set_value("Y");
        assert_eq!(cell.formatted_value(), &CellValue::from("Z"));
    }

    #[test]
    fn read_only_row_short_circuits() {
        let mut row = row_context(QueryReason::ReadOnlyCheck);
        let spec = ColumnSpec::new("a").with_read_only(true, Some("column locked".into()));

        let cell = resolve(&row, 0, &spec);
        assert!(cell.is_read_only());
        assert_eq!(cell.read_only_message(), "column locked");

        let cell = resolve(&row, 0, &ColumnSpec::new("a"));
        assert!(!cell.is_read_only());
        assert_eq!(cell.read_only_message(), "default");

        row.set_read_only(true);
        row.set_read_only_message("row locked");
        let cell = resolve(&row, 0, &spec);
        assert!(cell.is_read_only());
        assert_eq!(cell.read_only_message(), "row locked");
    }

    #[test]
    fn content_visibility_for_interactive_columns() {
        let mut row = row_context(QueryReason::Display);
        row.set_content_visible(false);

        let check = ColumnSpec::new("a").with_kind(ColumnKind::CheckBox);
        let mut cell = resolve(&row, 0, &check);
        assert!(!cell.content_visible());
        cell.set_content_visible(true);
        assert!(cell.content_visible());

        let text = ColumnSpec::new("b");
        assert!(resolve(&row, 1, &text).content_visible());
    }

    #[test]
    fn tooltip_seeded_from_row_for_tooltip_reason() {
        let mut row = row_context(QueryReason::Tooltip);
        row.add_error("bad value", "");
        let cell = resolve(&row, 0, &ColumnSpec::new("a"));
        assert_eq!(cell.tooltip_text(), "bad value");

        let mut row = row_context(QueryReason::Display);
        row.add_error("bad value", "");
        let cell = resolve(&row, 0, &ColumnSpec::new("a"));
        assert_eq!(cell.tooltip_text(), "");
    }

    #[test]
    fn hidden_content_hides_implicit_tooltip() {
        let mut row = row_context(QueryReason::Tooltip);
        row.set_tooltip_text("row tip");
        row.set_content_visible(false);
        let spec = ColumnSpec::new("a").with_kind(ColumnKind::Button);

        let mut cell = resolve(&row, 0, &spec);
        assert_eq!(cell.visible_tooltip(), "");
        cell.set_tooltip_text("explicit");
        assert_eq!(cell.visible_tooltip(), "explicit");
    }

    #[test]
    fn template_style_copied_on_write() {
        let row = row_context(QueryReason::Display);
        let spec = ColumnSpec::new("a")
            .with_style(CellStyle::aligned(HorizontalAlignment::Right), true);

        let mut cell = resolve(&row, 0, &spec);
        assert!(cell.style_is_template());
        cell.style_mut().alignment = HorizontalAlignment::Center;

        assert!(!cell.style_is_template());
        assert_eq!(cell.style().alignment, HorizontalAlignment::Center);
        assert_eq!(spec.style().alignment, HorizontalAlignment::Right);
    }

    #[test]
    fn value_tooltip_fills_empty_seed() {
        let row = row_context(QueryReason::Tooltip);
        let mut cell = CellAttributeContext::new();
        cell.initialize(&row, 0, &ColumnSpec::new("a"), CellValue::from(12.5), "")
            .unwrap();
        cell.seed_value_tooltip();
        assert_eq!(cell.tooltip_text(), "12.5");
        assert!(!cell.tooltip_is_explicit());
    }
}
