//! Query reasons, color categories, and severity kinds.

use crate::error::{GridError, Result};

/// Why an attribute query is being made.
///
/// The reason decides which attributes are meaningful and whether diagnostic
/// messages touch the tooltip text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryReason {
    /// Screen display (paint/format).
    #[default]
    Display,
    /// Print layout.
    Print,
    /// Tooltip text for the hovered row or cell.
    Tooltip,
    /// Read-only determination before an edit.
    ReadOnlyCheck,
}

impl QueryReason {
    /// Returns `true` if diagnostic messages are appended to the tooltip text.
    #[inline]
    pub fn collects_tooltip(&self) -> bool {
        matches!(self, QueryReason::Display | QueryReason::Tooltip)
    }

    /// Returns `true` if the four edge borders are drawn.
    #[inline]
    pub fn honors_edge_borders(&self) -> bool {
        matches!(self, QueryReason::Print)
    }

    /// Returns `true` if the diagonal strikes are drawn.
    #[inline]
    pub fn honors_diagonals(&self) -> bool {
        matches!(self, QueryReason::Display | QueryReason::Print)
    }
}

/// The semantic paint class of a row or cell.
///
/// Variants are declared in escalation order, so `max` picks the stronger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ColorCategory {
    /// Regular row.
    #[default]
    Normal = 0,
    /// Odd row when row alternation is enabled.
    Alternate = 1,
    /// Application-defined highlight.
    Special = 2,
    /// First subtotal level.
    Subtotal1 = 3,
    /// Second subtotal level.
    Subtotal2 = 4,
    /// Grand total row.
    TotalRow = 5,
    /// Row or cell carrying a warning.
    Warning = 6,
    /// Row or cell carrying an error.
    Error = 7,
    /// Header-like row.
    Header = 8,
}

impl ColorCategory {
    /// All categories in escalation order.
    pub const ALL: [ColorCategory; 9] = [
        ColorCategory::Normal,
        ColorCategory::Alternate,
        ColorCategory::Special,
        ColorCategory::Subtotal1,
        ColorCategory::Subtotal2,
        ColorCategory::TotalRow,
        ColorCategory::Warning,
        ColorCategory::Error,
        ColorCategory::Header,
    ];

    /// Returns the numeric value of this category.
    pub fn value(&self) -> i32 {
        *self as i32
    }
}

impl TryFrom<i32> for ColorCategory {
    type Error = GridError;

    fn try_from(value: i32) -> Result<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|index| ColorCategory::ALL.get(index).copied())
            .ok_or_else(|| {
                GridError::invalid_argument("category", format!("unknown color category {value}"))
            })
    }
}

/// Ordered diagnostic severity driving icon selection and color escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SeverityKind {
    /// No diagnostic.
    #[default]
    None = 0,
    /// Informational message.
    Info = 1,
    /// Warning.
    Warning = 2,
    /// Error.
    Error = 3,
}

impl SeverityKind {
    /// Returns the numeric value of this severity.
    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// Returns the more severe of `self` and `other`.
    #[inline]
    pub fn escalate(self, other: SeverityKind) -> SeverityKind {
        self.max(other)
    }

    /// Returns `true` if this severity satisfies a navigation threshold.
    ///
    /// `None` asks for rows without any severity, `Info` for any severity,
    /// `Warning` for warnings or errors, and `Error` for errors only.
    pub fn matches_threshold(&self, threshold: SeverityKind) -> bool {
        match threshold {
            SeverityKind::None => *self == SeverityKind::None,
            SeverityKind::Info => *self != SeverityKind::None,
            SeverityKind::Warning => *self >= SeverityKind::Warning,
            SeverityKind::Error => *self == SeverityKind::Error,
        }
    }

    /// The color category a cell escalates to for a message of this severity.
    pub fn color_category(&self) -> Option<ColorCategory> {
        match self {
            SeverityKind::Warning => Some(ColorCategory::Warning),
            SeverityKind::Error => Some(ColorCategory::Error),
            SeverityKind::None | SeverityKind::Info => None,
        }
    }

    /// Standard icon name for this severity, if any.
    pub fn icon_name(&self) -> Option<&'static str> {
        match self {
            SeverityKind::None => None,
            SeverityKind::Info => Some("dialog-information"),
            SeverityKind::Warning => Some("dialog-warning"),
            SeverityKind::Error => Some("dialog-error"),
        }
    }
}

impl TryFrom<i32> for SeverityKind {
    type Error = GridError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(SeverityKind::None),
            1 => Ok(SeverityKind::Info),
            2 => Ok(SeverityKind::Warning),
            3 => Ok(SeverityKind::Error),
            n => Err(GridError::invalid_argument(
                "severity",
                format!("unknown severity kind {n}"),
            )),
        }
    }
}
