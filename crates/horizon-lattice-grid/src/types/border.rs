//! Border styles for rows and cells.

use super::category::QueryReason;

/// Border line style.
///
/// `Default` means "not specified here", which lets a less specific level
/// (the row, for a cell) supply the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BorderStyle {
    /// Not specified.
    #[default]
    Default,
    /// Explicitly no border.
    None,
    /// Thin line.
    Thin,
    /// Thick line.
    Thick,
}

impl BorderStyle {
    /// Returns `true` if this style is `Default`.
    #[inline]
    pub fn is_default(&self) -> bool {
        matches!(self, BorderStyle::Default)
    }

    /// Returns `self` unless it is `Default`, in which case `fallback`.
    #[inline]
    pub fn or(self, fallback: BorderStyle) -> BorderStyle {
        if self.is_default() { fallback } else { self }
    }
}

/// The four edge borders plus the two diagonal strikes of a row or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Borders {
    /// Left edge.
    pub left: BorderStyle,
    /// Top edge.
    pub top: BorderStyle,
    /// Right edge.
    pub right: BorderStyle,
    /// Bottom edge.
    pub bottom: BorderStyle,
    /// Strike from bottom-left to top-right.
    pub diagonal_up: bool,
    /// Strike from top-left to bottom-right.
    pub diagonal_down: bool,
}

impl Borders {
    /// Creates borders with every edge set to `style` and no diagonals.
    pub const fn uniform(style: BorderStyle) -> Self {
        Self {
            left: style,
            top: style,
            right: style,
            bottom: style,
            diagonal_up: false,
            diagonal_down: false,
        }
    }

    /// Returns `true` if any edge is set or a diagonal is on.
    pub fn is_set(&self) -> bool {
        *self != Self::default()
    }

    /// Returns the borders that should be drawn for `reason`.
    ///
    /// Edge borders are print-only; diagonals are drawn for display and print.
    pub fn for_reason(&self, reason: QueryReason) -> Borders {
        let mut drawn = Borders::default();
        if reason.honors_edge_borders() {
            drawn.left = self.left;
            drawn.top = self.top;
            drawn.right = self.right;
            drawn.bottom = self.bottom;
        }
        if reason.honors_diagonals() {
            drawn.diagonal_up = self.diagonal_up;
            drawn.diagonal_down = self.diagonal_down;
        }
        drawn
    }
}
