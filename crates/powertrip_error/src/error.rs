//! Top-level error wrapper types.

use crate::{
    ActionError, ConfigError, MirrorError, SourceError, TaskError, TimeoutError, TransientError,
};

/// The union of every error the mirror can produce.
///
/// # Examples
///
/// ```
/// use powertrip_error::{PowertripError, ConfigError};
///
/// let err: PowertripError = ConfigError::new("missing token").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum PowertripErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Source queue error
    #[from(SourceError)]
    Source(SourceError),
    /// Mirror channel error
    #[from(MirrorError)]
    Mirror(MirrorError),
    /// Action dispatch error
    #[from(ActionError)]
    Action(ActionError),
    /// Backend call exceeded its bound
    #[from(TimeoutError)]
    Timeout(TimeoutError),
    /// Background task panicked or was cancelled
    #[from(TaskError)]
    Task(TaskError),
}

/// PowerTrip error with kind discrimination.
///
/// # Examples
///
/// ```
/// use powertrip_error::{PowertripResult, ConfigError};
///
/// fn load() -> PowertripResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// let err = load().unwrap_err();
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("PowerTrip Error: {}", _0)]
pub struct PowertripError(Box<PowertripErrorKind>);

impl PowertripError {
    /// Create a new error from a kind.
    pub fn new(kind: PowertripErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PowertripErrorKind {
        &self.0
    }

    /// Fatal errors terminate the process instead of entering the cooldown.
    pub fn is_fatal(&self) -> bool {
        match self.kind() {
            PowertripErrorKind::Config(_) => true,
            PowertripErrorKind::Mirror(e) => !e.kind.is_transient() && !e.kind.is_not_found(),
            _ => false,
        }
    }

    /// True when the mirror reported the target as already deleted.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), PowertripErrorKind::Mirror(e) if e.kind.is_not_found())
    }

    /// Short human readable description without location details.
    ///
    /// Used for labels and channel notices where file/line noise is unwanted.
    pub fn summary(&self) -> String {
        match self.kind() {
            PowertripErrorKind::Config(e) => e.message.clone(),
            PowertripErrorKind::Source(e) => e.kind.to_string(),
            PowertripErrorKind::Mirror(e) => e.kind.to_string(),
            PowertripErrorKind::Action(e) => e.kind.to_string(),
            PowertripErrorKind::Timeout(e) => format!("{} timed out", e.operation),
            PowertripErrorKind::Task(e) => e.message.clone(),
        }
    }
}

impl TransientError for PowertripError {
    fn is_transient(&self) -> bool {
        match self.kind() {
            PowertripErrorKind::Config(_) => false,
            PowertripErrorKind::Source(e) => e.is_transient(),
            PowertripErrorKind::Mirror(e) => e.is_transient(),
            PowertripErrorKind::Action(_) => false,
            PowertripErrorKind::Timeout(_) => true,
            PowertripErrorKind::Task(_) => true,
        }
    }
}

// Generic From implementation for any type that converts to PowertripErrorKind
impl<T> From<T> for PowertripError
where
    T: Into<PowertripErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for PowerTrip operations.
pub type PowertripResult<T> = std::result::Result<T, PowertripError>;
