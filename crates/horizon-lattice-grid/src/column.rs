//! Column-level attribute configuration.
//!
//! A [`ColumnSpec`] holds the per-column overrides that cell resolution layers
//! on top of the row attributes. A [`ColumnSet`] is the ordered collection the
//! resolver works against; it also resolves the logical column names that
//! diagnostic messages are routed to.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{BorderStyle, CellStyle, ColorCategory, ColumnKind};

/// Configuration of a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    name: String,
    kind: ColumnKind,
    visible: bool,
    minimum_category: ColorCategory,
    default_grayed: Option<bool>,
    left_border: BorderStyle,
    right_border: BorderStyle,
    read_only: bool,
    read_only_message: Option<String>,
    style: Arc<CellStyle>,
    style_is_template: bool,
}

impl ColumnSpec {
    /// Creates a visible text column with no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Text,
            visible: true,
            minimum_category: ColorCategory::Normal,
            default_grayed: None,
            left_border: BorderStyle::Default,
            right_border: BorderStyle::Default,
            read_only: false,
            read_only_message: None,
            style: Arc::new(CellStyle::default()),
            style_is_template: true,
        }
    }

    /// Sets the column kind.
    pub fn with_kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Sets the lowest color category cells of this column may have.
    pub fn with_minimum_category(mut self, category: ColorCategory) -> Self {
        self.minimum_category = category;
        self
    }

    /// Sets the grayed state used when the row does not override it.
    pub fn with_default_grayed(mut self, grayed: bool) -> Self {
        self.default_grayed = Some(grayed);
        self
    }

    /// Sets the left and right border overrides.
    pub fn with_side_borders(mut self, left: BorderStyle, right: BorderStyle) -> Self {
        self.left_border = left;
        self.right_border = right;
        self
    }

    /// Marks the column read-only, with an optional explanation.
    pub fn with_read_only(mut self, read_only: bool, message: Option<String>) -> Self {
        self.read_only = read_only;
        self.read_only_message = message;
        self
    }

    /// Sets the cell style.
    ///
    /// A template style is shared by all cells of the column and is copied
    /// before a cell callback modifies it.
    pub fn with_style(mut self, style: CellStyle, is_template: bool) -> Self {
        self.style = Arc::new(style);
        self.style_is_template = is_template;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn minimum_category(&self) -> ColorCategory {
        self.minimum_category
    }

    pub fn default_grayed(&self) -> Option<bool> {
        self.default_grayed
    }

    pub fn left_border(&self) -> BorderStyle {
        self.left_border
    }

    pub fn right_border(&self) -> BorderStyle {
        self.right_border
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn read_only_message(&self) -> Option<&str> {
        self.read_only_message.as_deref()
    }

    pub fn style(&self) -> &Arc<CellStyle> {
        &self.style
    }

    pub fn style_is_template(&self) -> bool {
        self.style_is_template
    }
}

/// The ordered columns of a grid view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    columns: Vec<ColumnSpec>,
    by_name: HashMap<String, usize>,
}

impl ColumnSet {
    /// Creates an empty column set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a column set from specs.
    pub fn from_specs(specs: impl IntoIterator<Item = ColumnSpec>) -> Self {
        let mut set = Self::new();
        for spec in specs {
            set.push(spec);
        }
        set
    }

    /// Appends a column and returns its index.
    ///
    /// Duplicate names keep resolving to the first column with that name.
    pub fn push(&mut self, spec: ColumnSpec) -> usize {
        let index = self.columns.len();
        self.by_name.entry(spec.name.clone()).or_insert(index);
        self.columns.push(spec);
        index
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_column(mut self, spec: ColumnSpec) -> Self {
        self.push(spec);
        self
    }

    /// Number of columns, visible or not.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column at `index`.
    pub fn get(&self, index: usize) -> Option<&ColumnSpec> {
        self.columns.get(index)
    }

    /// Iterates over the columns in order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter()
    }

    /// Resolves a column name to the index of a visible column.
    ///
    /// Hidden and unknown columns resolve to `None`.
    pub fn resolve_visible(&self, name: &str) -> Option<usize> {
        let index = *self.by_name.get(name)?;
        self.columns[index].visible.then_some(index)
    }

    /// Resolves a comma-separated list of column names.
    ///
    /// Names are trimmed; names that do not resolve are skipped.
    pub fn resolve_list<'a>(&'a self, names: &'a str) -> impl Iterator<Item = usize> + 'a {
        names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(move |name| self.resolve_visible(name))
    }
}
