//! Row and cell attribute resolution.
//!
//! [`AttributeResolver`] drives the two-phase protocol: a row is resolved into
//! a [`RowAttributeContext`], then its cells into [`CellAttributeContext`]s
//! that start from the row's escalated attributes. Application callbacks
//! refine both. Callback failures go through a [`FailureReporter`].

mod cell;
mod engine;
mod report;
mod row;

pub use cell::CellAttributeContext;
pub use engine::{
    AttributeResolver, CellAttributeCallback, GridSource, ResolvePhase, RowAttributeCallback,
};
pub use report::{
    CallbackError, CallbackFailure, CallbackResult, CallbackStage, FailureHook, FailureReporter,
};
pub use row::RowAttributeContext;
