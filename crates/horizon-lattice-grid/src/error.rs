//! Error types for attribute resolution.

/// Result type alias for grid attribute operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while resolving grid attributes.
///
/// Every variant except [`GridError::Callback`] signals a caller bug rather
/// than a runtime condition. Callback failures never escape the resolver; they
/// are carried by [`CallbackFailure`](crate::resolve::CallbackFailure) to the
/// failure reporter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// An operation was requested in a phase that does not allow it.
    #[error("Invalid state for '{operation}': {message}")]
    InvalidState {
        operation: &'static str,
        message: String,
    },

    /// An argument had a value outside its domain.
    #[error("Invalid argument '{name}': {message}")]
    InvalidArgument { name: &'static str, message: String },

    /// A row index past the end of the source.
    #[error("Row {row} is out of range (row count {row_count})")]
    RowOutOfRange { row: usize, row_count: usize },

    /// A column index past the end of the column set.
    #[error("Column {column} is out of range (column count {column_count})")]
    ColumnOutOfRange { column: usize, column_count: usize },

    /// An application callback reported a failure.
    #[error("{stage} callback failed: {message}")]
    Callback { stage: &'static str, message: String },
}

impl GridError {
    /// Create an invalid-state error.
    pub fn invalid_state(operation: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidState {
            operation,
            message: message.into(),
        }
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// Create a callback error.
    pub fn callback(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Callback {
            stage,
            message: message.into(),
        }
    }

    /// Returns `true` if this error indicates a programming error in the caller.
    pub fn is_programming_error(&self) -> bool {
        !matches!(self, Self::Callback { .. })
    }
}
