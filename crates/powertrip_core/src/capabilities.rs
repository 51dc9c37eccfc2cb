//! Which moderation actions each item kind offers.

use crate::{BanDuration, MAX_CONTROLS_PER_ROW, MAX_ROWS};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Item kind without content, used in capability sets and configuration.
///
/// # Examples
///
/// ```
/// use powertrip_core::KindTag;
/// use std::str::FromStr;
///
/// assert_eq!(KindTag::from_str("comment").unwrap(), KindTag::Comment);
/// assert_eq!(KindTag::Submission.to_string(), "submission");
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
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KindTag {
    /// Comments
    Comment,
    /// Submissions
    Submission,
}

/// Most temporary ban lengths a mirror can show. The first row holds the
/// approve and remove buttons, and the permanent ban takes one more slot.
pub const MAX_BAN_DURATIONS: usize = (MAX_ROWS - 1) * MAX_CONTROLS_PER_ROW - 1;

/// Per-kind action availability plus the configured ban lengths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into), default)]
pub struct ActionCapabilities {
    /// Kinds offering "Remove with reason"
    reasons_for: Vec<KindTag>,
    /// Kinds offering ban buttons
    bans_for: Vec<KindTag>,
    /// Temporary ban lengths in days, in button order
    ban_durations: Vec<u16>,
}

impl Default for ActionCapabilities {
    fn default() -> Self {
        Self {
            reasons_for: vec![KindTag::Submission, KindTag::Comment],
            bans_for: vec![KindTag::Comment, KindTag::Submission],
            ban_durations: vec![3, 7, 28],
        }
    }
}

impl ActionCapabilities {
    /// Creates a new builder for `ActionCapabilities`.
    pub fn builder() -> ActionCapabilitiesBuilder {
        ActionCapabilitiesBuilder::default()
    }

    /// Whether removal reasons are offered for the kind.
    pub fn reasons_enabled(&self, kind: KindTag) -> bool {
        self.reasons_for.contains(&kind)
    }

    /// Whether bans are offered for the kind.
    pub fn bans_enabled(&self, kind: KindTag) -> bool {
        self.bans_for.contains(&kind)
    }

    /// Ban buttons in display order: every configured length, then permanent.
    pub fn ban_options(&self) -> Vec<BanDuration> {
        self.ban_durations
            .iter()
            .map(|days| BanDuration::Days(*days))
            .chain(std::iter::once(BanDuration::Permanent))
            .collect()
    }
}
