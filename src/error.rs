//! Error types shared by every generator flavour.

use thiserror::Error;

/// Result type returned by resumption calls.
pub type GenResult<T> = Result<T, GenError>;

/// Recoverable failures of the resume contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// The generator already returned its terminal value (or was closed).
    #[error("generator already exhausted")]
    Exhausted,

    /// A value was sent to a generator that never reached a suspension point.
    #[error("can't send a value to a just-started generator")]
    SendToCreated,

    /// The stack for a closure generator could not be mapped.
    #[error("failed to allocate coroutine stack: {0}")]
    StackAllocation(String),
}
