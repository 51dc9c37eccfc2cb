//! Reddit API data transfer objects.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Password-grant token response.
///
/// Reddit answers a rejected grant with `200 OK` and an `error` field.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// A listing page.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Listing {
    data: ListingData,
}

/// Listing body.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
    #[serde(default)]
    after: Option<String>,
}

/// A typed listing entry (`t1` comment, `t3` submission, ...).
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Thing {
    kind: String,
    data: ThingData,
}

/// Fields shared by comments and submissions, plus the kind-specific ones.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ThingData {
    id: String,
    subreddit: String,
    #[serde(default)]
    author: Option<String>,
    permalink: String,
    created_utc: f64,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    selftext: Option<String>,
    #[serde(default)]
    url: Option<String>,
    /// `[reason, count, snoozed, can_snooze]` tuples
    #[serde(default)]
    user_reports: Option<Vec<Vec<serde_json::Value>>>,
    /// `[reason, moderator]` pairs
    #[serde(default)]
    mod_reports: Option<Vec<Vec<serde_json::Value>>>,
    #[serde(default)]
    media_metadata: Option<HashMap<String, MediaMetadata>>,
    #[serde(default)]
    gallery_data: Option<GalleryData>,
}

/// Gallery media entry.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct MediaMetadata {
    /// Source rendition, absent while media is still processing
    #[serde(default)]
    s: Option<MediaSource>,
}

/// Source rendition of a gallery media entry.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct MediaSource {
    #[serde(default)]
    u: Option<String>,
}

/// Gallery ordering.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct GalleryData {
    #[serde(default)]
    items: Vec<GalleryItem>,
}

/// One gallery slot.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct GalleryItem {
    media_id: String,
}

/// Removal reasons of one subreddit.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct RemovalReasonsResponse {
    #[serde(default)]
    data: HashMap<String, RemovalReasonEntry>,
    #[serde(default)]
    order: Vec<String>,
}

/// A single removal reason.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct RemovalReasonEntry {
    id: String,
    title: String,
    #[serde(default)]
    message: String,
}

/// Body of the removal reason attach call, sent as the `json` form field.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalReasonAttach<'a> {
    pub item_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mod_note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason_id: Option<&'a str>,
}

/// Body of the removal message calls.
#[derive(Debug, Clone, Serialize)]
pub struct RemovalMessageBody<'a> {
    pub item_id: String,
    pub message: &'a str,
    pub title: &'a str,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

/// `api_type=json` response envelope.
#[derive(Debug, Clone, Default, Deserialize, Getters)]
pub struct JsonEnvelope {
    #[serde(default)]
    json: JsonErrors,
}

/// Errors reported inside an otherwise successful response.
#[derive(Debug, Clone, Default, Deserialize, Getters)]
pub struct JsonErrors {
    /// `[code, message, field]` triples
    #[serde(default)]
    errors: Vec<Vec<serde_json::Value>>,
}
