//! Configuration error types.

/// Configuration error with source location.
///
/// Configuration errors are fatal: a misconfigured target never heals by
/// retrying, so the process exits instead of entering the cooldown loop.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// Error message
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with the given message at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use powertrip_error::ConfigError;
    ///
    /// let err = ConfigError::new("discord.queue_channel is not set");
    /// assert!(err.message.contains("queue_channel"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
