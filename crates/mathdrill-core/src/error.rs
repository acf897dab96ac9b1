//! Error types for running a quiz session.

use thiserror::Error;

/// Errors that can abort a session.
///
/// Wrong answers are never errors; they are recorded as
/// [`TaskStatus::Error`](crate::TaskStatus::Error) and the session moves on.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input channel closed before a line could be read.
    #[error("input closed before an answer was entered")]
    InputClosed,

    /// Reading from or writing to the console failed.
    #[error("console I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
