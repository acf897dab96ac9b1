//! Error types for authorization and result publishing.
//!
//! [`SheetsErrorCode::NotFound`] is the only recoverable code: a token cache
//! miss sends the authorizer into the interactive grant. Everything else ends
//! the session.

use std::fmt;
use thiserror::Error;

/// The category of a sheets error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetsErrorCode {
    /// No cached token (missing, unreadable or unparsable file).
    NotFound,
    /// Obtaining or persisting a credential failed.
    Authorization,
    /// Appending the session result to the spreadsheet failed.
    Publish,
    /// The remote service rejected the credential (401).
    Authentication,
    /// Network error: connection failed, timeout, DNS resolution, etc.
    Network,
    /// Too many requests (429).
    RateLimited,
    /// The remote service returned an error status.
    Server,
    /// The response could not be parsed.
    InvalidResponse,
    /// Missing or invalid client configuration.
    Configuration,
    /// Local file I/O failed.
    Io,
    /// Unexpected internal state.
    Internal,
}

impl SheetsErrorCode {
    /// Returns a machine-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Authorization => "authorization_failed",
            Self::Publish => "publish_failed",
            Self::Authentication => "authentication_failed",
            Self::Network => "network_error",
            Self::RateLimited => "rate_limited",
            Self::Server => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Configuration => "configuration_error",
            Self::Io => "io_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for SheetsErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from the token store, the OAuth endpoints or the Sheets API.
#[derive(Debug, Error)]
pub struct SheetsError {
    code: SheetsErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SheetsError {
    /// Creates a new error with the given code and message.
    pub fn new(code: SheetsErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a token cache miss.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::NotFound, message)
    }

    /// Creates an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Authorization, message)
    }

    /// Creates a publish error.
    pub fn publish(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Publish, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Authentication, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Network, message)
    }

    /// Creates a rate limit error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::RateLimited, message)
    }

    /// Creates a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Server, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::InvalidResponse, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Configuration, message)
    }

    /// Creates a local I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Io, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SheetsErrorCode::Internal, message)
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> SheetsErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true for a token cache miss.
    pub fn is_not_found(&self) -> bool {
        self.code == SheetsErrorCode::NotFound
    }
}

impl fmt::Display for SheetsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for sheets operations.
pub type SheetsResult<T> = Result<T, SheetsError>;
