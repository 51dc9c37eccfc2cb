//! Error types for the PowerTrip moderation queue mirror.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error is classified by [`TransientError`]. Transient failures are
//! waited out by the supervisor's cooldown; configuration errors are fatal.
//!
//! # Examples
//!
//! ```
//! use powertrip_error::{PowertripResult, SourceError, SourceErrorKind, TransientError};
//!
//! fn fetch() -> PowertripResult<Vec<String>> {
//!     Err(SourceError::new(SourceErrorKind::Request("reset".to_string())))?
//! }
//!
//! let err = fetch().unwrap_err();
//! assert!(err.is_transient());
//! assert!(!err.is_fatal());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod config;
mod error;
mod mirror;
mod source;
mod task;
mod timeout;
mod transient;

pub use action::{ActionError, ActionErrorKind};
pub use config::ConfigError;
pub use error::{PowertripError, PowertripErrorKind, PowertripResult};
pub use mirror::{MirrorError, MirrorErrorKind};
pub use source::{SourceError, SourceErrorKind};
pub use task::TaskError;
pub use timeout::TimeoutError;
pub use transient::TransientError;
