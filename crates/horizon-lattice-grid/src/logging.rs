//! Tracing targets and span names used by attribute resolution.
//!
//! The crate logs through `tracing`; install a subscriber in the application
//! to see the output:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_lattice_grid::resolve=debug")
//!     .init();
//! ```

/// Span names for the resolution phases.
pub mod span_names {
    /// Row attribute resolution span.
    pub const ROW: &str = "horizon_lattice_grid::row";
    /// Cell attribute resolution span.
    pub const CELL: &str = "horizon_lattice_grid::cell";
}

/// Target names for log filtering.
pub mod targets {
    /// Resolver state machine and queries.
    pub const RESOLVE: &str = "horizon_lattice_grid::resolve";
    /// Message routing.
    pub const MESSAGES: &str = "horizon_lattice_grid::messages";
    /// Callback failure reporting.
    pub const FAILURES: &str = "horizon_lattice_grid::failures";
}
