//! Action dispatch error types.

/// Action dispatch error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ActionErrorKind {
    /// Component id was not produced by this system
    #[display("Unrecognized control: {}", _0)]
    UnrecognizedControl(String),
    /// Component belongs to a different item than the bound mirror
    #[display("Control for {} does not match bound item {}", control, bound)]
    ItemMismatch {
        /// Item id carried by the control
        control: String,
        /// Item id of the binding
        bound: String,
    },
    /// A moderation request could not be assembled
    #[display("Invalid request: {}", _0)]
    InvalidRequest(String),
}

/// Action error with source location tracking.
///
/// # Examples
///
/// ```
/// use powertrip_error::{ActionError, ActionErrorKind};
///
/// let err = ActionError::new(ActionErrorKind::UnrecognizedControl("xyz".to_string()));
/// assert!(format!("{}", err).contains("xyz"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Action Error: {} at line {} in {}", kind, line, file)]
pub struct ActionError {
    /// The kind of error that occurred
    pub kind: ActionErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ActionError {
    /// Create a new ActionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ActionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
