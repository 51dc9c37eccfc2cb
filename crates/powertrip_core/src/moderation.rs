//! Moderation requests sent back to the source queue.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A subreddit removal reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RemovalReason {
    /// Reason id
    id: String,
    /// Short title shown in the picker
    title: String,
    /// Message template sent to the author
    message: String,
}

impl RemovalReason {
    /// Create a new removal reason.
    pub fn new(id: impl Into<String>, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            message: message.into(),
        }
    }

    /// Removal message to send for this reason, if it carries any text.
    pub fn removal_message(&self) -> Option<RemovalMessage> {
        if self.message.trim().is_empty() {
            None
        } else {
            Some(RemovalMessage {
                title: self.title.clone(),
                message: self.message.clone(),
            })
        }
    }
}

/// Options for a removal. Both fields empty is a plain removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOptions {
    /// Moderator note attached to the removal
    pub mod_note: Option<String>,
    /// Removal reason id
    pub reason_id: Option<String>,
}

impl RemoveOptions {
    /// True when nothing beyond a plain removal is requested.
    pub fn is_plain(&self) -> bool {
        self.mod_note.is_none() && self.reason_id.is_none()
    }
}

/// A private removal message sent to the item's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalMessage {
    /// Message title
    pub title: String,
    /// Message body
    pub message: String,
}

/// Ban length.
///
/// Displays as the custom id fragment: the day count, or `perm`.
///
/// # Examples
///
/// ```
/// use powertrip_core::BanDuration;
///
/// assert_eq!(BanDuration::Days(7).to_string(), "7");
/// assert_eq!(BanDuration::Permanent.to_string(), "perm");
/// assert_eq!(BanDuration::Days(7).label(), "7 Day Ban");
/// assert_eq!(BanDuration::Permanent.days(), None);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum BanDuration {
    /// Temporary ban, 1..=999 days
    #[display("{}", _0)]
    Days(u16),
    /// Permanent ban
    #[display("perm")]
    Permanent,
}

impl BanDuration {
    /// Longest temporary ban the source accepts.
    pub const MAX_DAYS: u16 = 999;

    /// Day count, `None` for permanent bans.
    pub fn days(&self) -> Option<u16> {
        match self {
            BanDuration::Days(days) => Some(*days),
            BanDuration::Permanent => None,
        }
    }

    /// Button label.
    pub fn label(&self) -> String {
        match self {
            BanDuration::Days(days) => format!("{} Day Ban", days),
            BanDuration::Permanent => "Permanent Ban".to_string(),
        }
    }

    /// Parse the custom id fragment produced by `Display`.
    pub fn parse(fragment: &str) -> Option<Self> {
        if fragment == "perm" {
            return Some(BanDuration::Permanent);
        }
        match fragment.parse::<u16>() {
            Ok(days) if (1..=Self::MAX_DAYS).contains(&days) => Some(BanDuration::Days(days)),
            _ => None,
        }
    }
}

/// A ban against an item's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct BanRequest {
    /// Subreddit to ban from
    subreddit: String,
    /// Account to ban
    author: String,
    /// Ban length
    duration: BanDuration,
    /// Moderator note (at most 300 chars)
    note: String,
    /// Message shown to the banned user
    #[builder(default)]
    ban_message: Option<String>,
    /// Short public reason (at most 100 chars)
    #[builder(default)]
    ban_reason: Option<String>,
    /// Fullname of the item that triggered the ban
    context: String,
}

impl BanRequest {
    /// Creates a new builder for `BanRequest`.
    pub fn builder() -> BanRequestBuilder {
        BanRequestBuilder::default()
    }
}
