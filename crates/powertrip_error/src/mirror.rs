//! Mirror channel (Discord) error types.

use crate::TransientError;

/// Mirror channel error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MirrorErrorKind {
    /// HTTP error returned by the Discord API
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Any other serenity failure (gateway, model, transport)
    #[display("Serenity error: {}", _0)]
    Serenity(String),
    /// The configured channel does not exist or is not visible
    #[display("Channel not found: {}", _0)]
    ChannelNotFound(u64),
    /// The configured channel exists but cannot hold mirrors
    #[display("Channel unusable: {}", _0)]
    ChannelUnusable(String),
    /// The gateway has not delivered the ready event yet
    #[display("Gateway not ready")]
    NotReady,
}

impl MirrorErrorKind {
    /// Check if this error type should be waited out.
    pub fn is_transient(&self) -> bool {
        match self {
            MirrorErrorKind::Http { status_code, .. } => *status_code != 404,
            MirrorErrorKind::Serenity(_) => true,
            MirrorErrorKind::NotReady => true,
            MirrorErrorKind::ChannelNotFound(_) => false,
            MirrorErrorKind::ChannelUnusable(_) => false,
        }
    }

    /// Check if this error means the target is already gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MirrorErrorKind::Http { status_code: 404, .. })
    }
}

/// Mirror error with source location tracking.
///
/// # Examples
///
/// ```
/// use powertrip_error::{MirrorError, MirrorErrorKind};
///
/// let err = MirrorError::new(MirrorErrorKind::ChannelNotFound(42));
/// assert!(format!("{}", err).contains("42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Mirror Error: {} at line {} in {}", kind, line, file)]
pub struct MirrorError {
    /// The kind of error that occurred
    pub kind: MirrorErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MirrorError {
    /// Create a new MirrorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MirrorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl TransientError for MirrorError {
    fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}
