//! Timeout error types.

use std::time::Duration;

/// A backend call that did not finish within its bound.
///
/// Always transient.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Timeout Error: {} exceeded {:?} at line {} in {}", operation, limit, line, file)]
pub struct TimeoutError {
    /// Name of the operation that timed out
    pub operation: String,
    /// The bound that was exceeded
    pub limit: Duration,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TimeoutError {
    /// Create a new TimeoutError for the named operation.
    ///
    /// # Examples
    ///
    /// ```
    /// use powertrip_error::TimeoutError;
    /// use std::time::Duration;
    ///
    /// let err = TimeoutError::new("list_queue", Duration::from_secs(30));
    /// assert!(format!("{}", err).contains("list_queue"));
    /// ```
    #[track_caller]
    pub fn new(operation: impl Into<String>, limit: Duration) -> Self {
        let location = std::panic::Location::caller();
        Self {
            operation: operation.into(),
            limit,
            line: location.line(),
            file: location.file(),
        }
    }
}
