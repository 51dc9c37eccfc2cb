//! Failure classification shared by every error type.

/// Classifies an error as transient (worth waiting out) or not.
///
/// The supervisor uses this to decide between the cooldown path and
/// terminating the process.
///
/// # Examples
///
/// ```
/// use powertrip_error::{SourceError, SourceErrorKind, TransientError};
///
/// let err = SourceError::new(SourceErrorKind::Http {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_transient());
/// ```
pub trait TransientError {
    /// Returns true if waiting and retrying later may succeed.
    fn is_transient(&self) -> bool;
}
