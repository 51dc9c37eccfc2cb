//! Source queue (Reddit) error types.

use crate::TransientError;

/// Source queue error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SourceErrorKind {
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// The request never produced a response (connect, TLS, body read)
    #[display("Request failed: {}", _0)]
    Request(String),
    /// Token exchange was rejected
    #[display("Authentication failed: {}", _0)]
    Authentication(String),
    /// Response body did not match the expected shape
    #[display("Failed to decode response: {}", _0)]
    Decode(String),
    /// The item has no resolvable author
    #[display("Author unavailable for {}", _0)]
    MissingAuthor(String),
    /// The platform reported a logical failure in an otherwise successful response
    #[display("Rejected by source: {}", _0)]
    Rejected(String),
}

impl SourceErrorKind {
    /// Check if this error type should be waited out.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 401 | 403 | 408 | 429 | 500 | 502 | 503 | 504)
            }
            SourceErrorKind::Request(_) => true,
            SourceErrorKind::Authentication(_) => true,
            SourceErrorKind::Decode(_) => true,
            SourceErrorKind::MissingAuthor(_) => false,
            SourceErrorKind::Rejected(_) => false,
        }
    }
}

/// Source error with source location tracking.
///
/// # Examples
///
/// ```
/// use powertrip_error::{SourceError, SourceErrorKind};
///
/// let err = SourceError::new(SourceErrorKind::Request("connection reset".to_string()));
/// assert!(format!("{}", err).contains("connection reset"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Source Error: {} at line {} in {}", kind, line, file)]
pub struct SourceError {
    /// The kind of error that occurred
    pub kind: SourceErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl SourceError {
    /// Create a new SourceError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SourceErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl TransientError for SourceError {
    fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}
