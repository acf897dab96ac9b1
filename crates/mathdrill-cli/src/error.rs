//! Client error types.

use std::error::Error as _;
use std::fmt;

use mathdrill_core::CoreError;
use mathdrill_sheets::SheetsError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// The quiz session could not be completed.
    Session(CoreError),
    /// Authorization or publishing failed.
    Sheets(SheetsError),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Session(err) => write!(f, "session error: {}", err),
            Self::Sheets(err) => write!(f, "{}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Session(err) => err.source(),
            Self::Sheets(err) => err.source(),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        Self::Session(err)
    }
}

impl From<SheetsError> for ClientError {
    fn from(err: SheetsError) -> Self {
        Self::Sheets(err)
    }
}
