//! Types passed across the collaborator traits.

use derive_builder::Builder;
use derive_getters::Getters;
use powertrip_core::MessageHandle;
use serde::{Deserialize, Serialize};

/// A user invoked a control on a mirror.
///
/// # Examples
///
/// ```
/// use powertrip_interface::ComponentEvent;
/// use powertrip_core::MessageHandle;
///
/// let event = ComponentEvent::builder()
///     .handle(MessageHandle::from(42))
///     .custom_id("pt:a1:approve")
///     .actor("modname")
///     .build()
///     .unwrap();
///
/// assert!(event.values().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ComponentEvent {
    /// Message the control is attached to
    handle: MessageHandle,
    /// Custom id of the invoked control
    custom_id: String,
    /// Selected values, for select menus
    #[builder(default)]
    values: Vec<String>,
    /// Display name of the invoking user
    actor: String,
}

impl ComponentEvent {
    /// Creates a new builder for `ComponentEvent`.
    pub fn builder() -> ComponentEventBuilder {
        ComponentEventBuilder::default()
    }
}
