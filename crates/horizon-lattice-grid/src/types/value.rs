//! Cell values, column kinds, styles, and icons.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

/// The value shown in a cell.
///
/// Simple variants have a text form used for default tooltips; `Custom`
/// carries arbitrary application data and has none.
#[derive(Clone, Default)]
pub enum CellValue {
    /// No value.
    #[default]
    Null,
    /// Text.
    Text(String),
    /// Integer.
    Integer(i64),
    /// Floating point.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without time zone.
    DateTime(NaiveDateTime),
    /// Application data (type-erased).
    Custom(Arc<dyn std::any::Any + Send + Sync>),
}

impl CellValue {
    /// Creates custom data from any type.
    pub fn custom<T: std::any::Any + Send + Sync + 'static>(value: T) -> Self {
        CellValue::Custom(Arc::new(value))
    }

    /// Returns `true` for `Null` and for empty text.
    pub fn is_null_like(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text form of simple value types.
    ///
    /// Returns `None` for `Null` and `Custom`.
    pub fn display_text(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null | CellValue::Custom(_) => None,
            CellValue::Text(s) => Some(Cow::Borrowed(s.as_str())),
            CellValue::Integer(n) => Some(Cow::Owned(n.to_string())),
            CellValue::Float(n) => Some(Cow::Owned(n.to_string())),
            CellValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            CellValue::Date(d) => Some(Cow::Owned(d.format("%Y-%m-%d").to_string())),
            CellValue::DateTime(dt) => {
                Some(Cow::Owned(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
            }
        }
    }

    /// Attempts to get the value as a string slice.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: std::any::Any>(&self) -> Option<&T> {
        match self {
            CellValue::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "Null"),
            CellValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            CellValue::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            CellValue::Float(n) => f.debug_tuple("Float").field(n).finish(),
            CellValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            CellValue::Date(d) => f.debug_tuple("Date").field(d).finish(),
            CellValue::DateTime(dt) => f.debug_tuple("DateTime").field(dt).finish(),
            CellValue::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Integer(a), CellValue::Integer(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a == b,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Custom values compare by identity
            (CellValue::Custom(a), CellValue::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Integer(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Integer(n as i64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Float(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(CellValue::Null, Into::into)
    }
}

/// What a column displays, which decides how content visibility applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColumnKind {
    /// Plain text.
    #[default]
    Text,
    /// Numeric value.
    Number,
    /// Date or date-time value.
    Date,
    /// Check box.
    CheckBox,
    /// Push button.
    Button,
    /// Drop-down choice.
    Choice,
    /// Image.
    Image,
}

impl ColumnKind {
    /// Returns `true` for column kinds hidden when a row disables content visibility.
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            ColumnKind::CheckBox | ColumnKind::Button | ColumnKind::Choice
        )
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalAlignment {
    /// Align to the left edge.
    #[default]
    Left,
    /// Align to the center.
    Center,
    /// Align to the right edge.
    Right,
}

/// Presentation style of a column's cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    /// Horizontal alignment.
    pub alignment: HorizontalAlignment,
    /// Whether text wraps.
    pub wrap: bool,
    /// Number or date format pattern.
    pub format: Option<String>,
}

impl CellStyle {
    /// Creates a style with the given alignment.
    pub fn aligned(alignment: HorizontalAlignment) -> Self {
        Self {
            alignment,
            ..Default::default()
        }
    }

    /// Sets the format pattern.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Sets the wrap flag.
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }
}

/// A user-supplied icon, identified by name or path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRef(pub String);

impl IconRef {
    /// Creates an icon reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The icon name or path.
    pub fn name(&self) -> &str {
        &self.0
    }
}
