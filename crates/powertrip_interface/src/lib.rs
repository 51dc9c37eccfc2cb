//! Trait definitions for the PowerTrip moderation queue mirror.
//!
//! The core loop only ever talks to a [`SourceQueue`] and a
//! [`MirrorChannel`]; interactions come back through an
//! [`InteractionSink`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{InteractionSink, MirrorChannel, SourceQueue};
pub use types::{ComponentEvent, ComponentEventBuilder, ComponentEventBuilderError};
