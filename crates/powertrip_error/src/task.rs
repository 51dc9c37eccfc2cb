//! Background task error types.

/// A spawned task ended without producing a result (panic or cancellation).
///
/// Always transient: the supervisor treats it as the unhandled-error signal
/// and enters the cooldown.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Task Error: {} at line {} in {}", message, line, file)]
pub struct TaskError {
    /// What happened to the task
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TaskError {
    /// Create a new TaskError with the given message at the current location.
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
