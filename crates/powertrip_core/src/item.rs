//! Moderation queue items.

use crate::KindTag;
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Base-36 identifier of a queue item, without the kind prefix.
///
/// This is the reconciliation key: a mirror is tagged with it at post time
/// and matched back to the queue by it.
///
/// # Examples
///
/// ```
/// use powertrip_core::ItemId;
///
/// let id = ItemId::from("a1");
/// assert_eq!(id.as_str(), "a1");
/// assert_eq!(format!("{}", id), "a1");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// What the queue item is, with the content needed to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    /// A comment on a submission
    Comment {
        /// Comment text (markdown)
        body: String,
    },
    /// A submission (link or self post)
    Submission {
        /// Post title
        title: String,
        /// Self text, absent or empty for link posts
        selftext: Option<String>,
        /// Link target
        url: Option<String>,
        /// First gallery media url, when the post is a gallery
        media_url: Option<String>,
    },
}

impl ItemKind {
    /// Kind tag used by capability sets.
    pub fn tag(&self) -> KindTag {
        match self {
            ItemKind::Comment { .. } => KindTag::Comment,
            ItemKind::Submission { .. } => KindTag::Submission,
        }
    }

    /// Reddit type prefix for fullnames.
    pub fn prefix(&self) -> &'static str {
        match self {
            ItemKind::Comment { .. } => "t1",
            ItemKind::Submission { .. } => "t3",
        }
    }
}

/// Who filed a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum ReporterClass {
    /// An ordinary user report
    #[display("User")]
    User,
    /// A report filed by a moderator
    #[display("Mod")]
    Moderator,
}

/// A single report attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ReportSignal {
    /// Reporter class
    reporter: ReporterClass,
    /// Report reason text
    text: String,
}

impl ReportSignal {
    /// Create a new report signal.
    pub fn new(reporter: ReporterClass, text: impl Into<String>) -> Self {
        Self {
            reporter,
            text: text.into(),
        }
    }
}

/// A pending moderation queue entry.
///
/// # Examples
///
/// ```
/// use powertrip_core::{ItemKind, QueueItem};
/// use chrono::DateTime;
///
/// let item = QueueItem::builder()
///     .id("a1")
///     .kind(ItemKind::Comment { body: "hello".to_string() })
///     .subreddit("rust")
///     .author(Some("ferris".to_string()))
///     .permalink("/r/rust/comments/x/y/a1/")
///     .created_at(DateTime::from_timestamp(1, 0).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(item.fullname(), "t1_a1");
/// assert!(!item.is_reported());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct QueueItem {
    /// Item id
    id: ItemId,
    /// Item kind and content
    kind: ItemKind,
    /// Subreddit the item lives in
    subreddit: String,
    /// Author name, `None` when deleted or unresolvable
    #[builder(default)]
    author: Option<String>,
    /// Path of the item on reddit.com
    permalink: String,
    /// Creation time
    created_at: DateTime<Utc>,
    /// Whether the item is locked
    #[builder(default)]
    locked: bool,
    /// Reports filed against the item
    #[builder(default)]
    reports: Vec<ReportSignal>,
}

impl QueueItem {
    /// Creates a new builder for `QueueItem`.
    pub fn builder() -> QueueItemBuilder {
        QueueItemBuilder::default()
    }

    /// Reddit fullname (`t1_<id>` or `t3_<id>`).
    pub fn fullname(&self) -> String {
        format!("{}_{}", self.kind.prefix(), self.id)
    }

    /// Absolute link to the item.
    pub fn link(&self) -> String {
        format!("https://www.reddit.com{}", self.permalink)
    }

    /// True when at least one report is attached.
    pub fn is_reported(&self) -> bool {
        !self.reports.is_empty()
    }

    /// First report from the given reporter class.
    pub fn first_report(&self, reporter: ReporterClass) -> Option<&ReportSignal> {
        self.reports.iter().find(|r| r.reporter == reporter)
    }

    /// The text a moderator acts on: comment body, or title for submissions.
    pub fn headline(&self) -> &str {
        match &self.kind {
            ItemKind::Comment { body } => body,
            ItemKind::Submission { title, .. } => title,
        }
    }
}
