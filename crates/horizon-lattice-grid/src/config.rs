//! View configuration for attribute resolution.
//!
//! Process-wide preferences are passed in as [`GridDefaults`] when the
//! resolver is built; a [`GridConfig`] carries the per-view overrides and
//! falls back to those defaults. Nothing is read from ambient global state.

/// Process-wide defaults injected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridDefaults {
    /// Whether odd rows use the alternate color category.
    pub alternate_rows: bool,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self {
            alternate_rows: true,
        }
    }
}

/// Per-view configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridConfig {
    defaults: GridDefaults,
    alternate_rows: Option<bool>,
    read_only: bool,
    read_only_message: String,
    view_read_only_message: String,
    no_message_text: String,
    row_label: String,
}

impl GridConfig {
    /// Creates a configuration over the given process defaults.
    pub fn new(defaults: GridDefaults) -> Self {
        Self {
            defaults,
            alternate_rows: None,
            read_only: false,
            read_only_message: "This cell is read-only.".to_string(),
            view_read_only_message: "The table is read-only.".to_string(),
            no_message_text: "No message".to_string(),
            row_label: "Row".to_string(),
        }
    }

    /// Overrides row alternation for this view; `None` uses the process default.
    pub fn with_alternate_rows(mut self, alternate: Option<bool>) -> Self {
        self.alternate_rows = alternate;
        self
    }

    /// Makes the whole view read-only.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the default message for read-only rows and cells.
    pub fn with_read_only_message(mut self, message: impl Into<String>) -> Self {
        self.read_only_message = message.into();
        self
    }

    /// Sets the message reported when the whole view is read-only.
    pub fn with_view_read_only_message(mut self, message: impl Into<String>) -> Self {
        self.view_read_only_message = message.into();
        self
    }

    /// Sets the placeholder text for rows flagged without a message.
    pub fn with_no_message_text(mut self, text: impl Into<String>) -> Self {
        self.no_message_text = text.into();
        self
    }

    /// Sets the label used for positional row identifiers ("Row 3").
    pub fn with_row_label(mut self, label: impl Into<String>) -> Self {
        self.row_label = label.into();
        self
    }

    /// Sets the alternation override in place.
    pub fn set_alternate_rows(&mut self, alternate: Option<bool>) {
        self.alternate_rows = alternate;
    }

    /// Sets the view read-only flag in place.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Effective row alternation: the override if set, else the default.
    pub fn alternate_rows(&self) -> bool {
        self.alternate_rows.unwrap_or(self.defaults.alternate_rows)
    }

    /// The per-view alternation override.
    pub fn alternate_rows_override(&self) -> Option<bool> {
        self.alternate_rows
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn read_only_message(&self) -> &str {
        &self.read_only_message
    }

    pub fn view_read_only_message(&self) -> &str {
        &self.view_read_only_message
    }

    pub fn no_message_text(&self) -> &str {
        &self.no_message_text
    }

    pub fn row_label(&self) -> &str {
        &self.row_label
    }

    pub fn defaults(&self) -> &GridDefaults {
        &self.defaults
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(GridDefaults::default())
    }
}
