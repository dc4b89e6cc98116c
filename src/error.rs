//! Error types for the regexp subsystem.

use thiserror::Error;

/// Errors raised by pattern construction and matching.
///
/// `SyntaxError` and `TypeError` correspond to the language's catchable
/// exception values. `InternalError` signals an engine or consistency
/// fault rather than bad user input; callers should not treat it as
/// recoverable.
#[derive(Debug, Error)]
pub enum VmError {
    /// Bad regexp text or flags; carries the engine diagnostic.
    #[error("SyntaxError: {0}")]
    SyntaxError(String),

    /// Method invoked on a receiver of the wrong type.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Engine fault or broken invariant, distinct from user input faults.
    #[error("InternalError: {0}")]
    InternalError(String),
}

impl VmError {
    pub fn syntax_error(msg: impl Into<String>) -> Self {
        Self::SyntaxError(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

/// Result type for subsystem operations.
pub type VmResult<T> = std::result::Result<T, VmError>;
