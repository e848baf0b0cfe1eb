//! Row and cell attribute resolution for Horizon Lattice grids.
//!
//! A grid view asks, for every row and cell it paints, which presentation
//! attributes apply: color category, borders, graying, read-only state,
//! validation severity, icons, tooltips and messages. This crate computes
//! those answers on demand:
//!
//! - **Two-phase protocol**: resolve a row, then any of its cells
//! - **Escalation**: cells start from their row's attributes and the column defaults
//! - **Callbacks**: application code refines row and cell contexts
//! - **Messages**: per-row diagnostics routed to columns and collected for display
//! - **Navigation**: find the next row at a severity threshold
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_lattice_grid::prelude::*;
//!
//! let rows: Vec<Vec<CellValue>> = vec![vec![CellValue::from("a")], vec![CellValue::from("")]];
//! let columns = ColumnSet::new().with_column(ColumnSpec::new("code"));
//!
//! let resolver = AttributeResolver::new(Arc::new(rows), columns, GridConfig::default())
//!     .with_row_callback(|row| {
//!         if row.row() == 1 {
//!             row.add_warning("Code is empty", "code");
//!         }
//!         Ok(())
//!     });
//!
//! assert_eq!(
//!     resolver.find_severity_row(None, true, SeverityKind::Warning).unwrap(),
//!     Some(1)
//! );
//! ```

pub mod column;
pub mod config;
pub mod logging;
pub mod message;
pub mod resolve;
pub mod types;

mod error;

pub use error::{GridError, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::column::{ColumnSet, ColumnSpec};
    pub use crate::config::{GridConfig, GridDefaults};
    pub use crate::error::{GridError, Result};
    pub use crate::message::{GridMessage, MessageAggregator, MessageList};
    pub use crate::resolve::{
        AttributeResolver, CallbackFailure, CallbackResult, CellAttributeContext, GridSource,
        ResolvePhase, RowAttributeContext,
    };
    pub use crate::types::{
        BorderStyle, Borders, CellStyle, CellValue, ColorCategory, ColumnKind,
        HorizontalAlignment, IconRef, QueryReason, SeverityKind,
    };
}
