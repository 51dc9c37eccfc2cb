//! Conversions from Reddit payloads into PowerTrip types.

use crate::dto::{Listing, RemovalReasonsResponse, Thing, ThingData};
use chrono::DateTime;
use powertrip_core::{ItemKind, QueueItem, RemovalReason, ReportSignal, ReporterClass};
use powertrip_error::{SourceError, SourceErrorKind};
use tracing::{debug, warn};

/// Author placeholder Reddit uses for deleted accounts.
const DELETED_AUTHOR: &str = "[deleted]";

/// Converts one modqueue page into queue items, keeping listing order.
///
/// Entries of kinds other than comments and submissions are skipped.
pub fn queue_from_listing(listing: &Listing) -> Result<Vec<QueueItem>, SourceError> {
    let mut items = Vec::with_capacity(listing.data().children().len());
    for thing in listing.data().children() {
        if let Some(item) = queue_item(thing)? {
            items.push(item);
        }
    }
    Ok(items)
}

fn queue_item(thing: &Thing) -> Result<Option<QueueItem>, SourceError> {
    let data = thing.data();
    let kind = match thing.kind().as_str() {
        "t1" => ItemKind::Comment {
            body: data.body().clone().unwrap_or_default(),
        },
        "t3" => ItemKind::Submission {
            title: data.title().clone().unwrap_or_default(),
            selftext: data.selftext().clone().filter(|text| !text.is_empty()),
            url: data.url().clone().filter(|url| !url.is_empty()),
            media_url: gallery_media(data),
        },
        other => {
            warn!(kind = %other, id = %data.id(), "Skipping unsupported queue entry");
            return Ok(None);
        }
    };

    let created_at = DateTime::from_timestamp(*data.created_utc() as i64, 0).ok_or_else(|| {
        SourceError::new(SourceErrorKind::Decode(format!(
            "created_utc out of range for {}: {}",
            data.id(),
            data.created_utc()
        )))
    })?;

    let item = QueueItem::builder()
        .id(data.id().as_str())
        .kind(kind)
        .subreddit(data.subreddit().as_str())
        .author(author(data.author().as_deref()))
        .permalink(data.permalink().as_str())
        .created_at(created_at)
        .locked(*data.locked())
        .reports(reports(data))
        .build()
        .map_err(|e| {
            SourceError::new(SourceErrorKind::Decode(format!(
                "Failed to build queue item: {}",
                e
            )))
        })?;
    Ok(Some(item))
}

fn author(raw: Option<&str>) -> Option<String> {
    match raw {
        None | Some("") | Some(DELETED_AUTHOR) => None,
        Some(name) => Some(name.to_string()),
    }
}

fn reports(data: &ThingData) -> Vec<ReportSignal> {
    let user = data
        .user_reports()
        .iter()
        .flatten()
        .filter_map(|entry| report_text(entry))
        .map(|text| ReportSignal::new(ReporterClass::User, text));
    let moderator = data
        .mod_reports()
        .iter()
        .flatten()
        .filter_map(|entry| report_text(entry))
        .map(|text| ReportSignal::new(ReporterClass::Moderator, text));
    user.chain(moderator).collect()
}

/// The reason is the first element; it is `null` for reports without text.
fn report_text(entry: &[serde_json::Value]) -> Option<String> {
    entry
        .first()
        .and_then(|reason| reason.as_str())
        .filter(|reason| !reason.is_empty())
        .map(str::to_string)
}

/// Source url of the first gallery image.
fn gallery_media(data: &ThingData) -> Option<String> {
    let metadata = data.media_metadata().as_ref()?;
    let source_url = |id: &String| {
        metadata
            .get(id)
            .and_then(|media| media.s().as_ref())
            .and_then(|source| source.u().clone())
    };

    let ordered = data
        .gallery_data()
        .as_ref()
        .and_then(|gallery| gallery.items().first())
        .and_then(|first| source_url(first.media_id()));
    if ordered.is_some() {
        return ordered;
    }

    let mut ids: Vec<&String> = metadata.keys().collect();
    ids.sort();
    ids.into_iter().find_map(source_url)
}

/// Converts removal reasons, in the subreddit's configured order.
///
/// Reasons missing from the order list follow, sorted by id.
pub fn removal_reasons(response: &RemovalReasonsResponse) -> Vec<RemovalReason> {
    let mut reasons: Vec<RemovalReason> = response
        .order()
        .iter()
        .filter_map(|id| response.data().get(id))
        .map(|entry| RemovalReason::new(entry.id(), entry.title(), entry.message()))
        .collect();

    let mut unordered: Vec<&String> = response
        .data()
        .keys()
        .filter(|id| !response.order().contains(id))
        .collect();
    unordered.sort();
    if !unordered.is_empty() {
        debug!(count = unordered.len(), "Removal reasons missing from order");
    }
    reasons.extend(
        unordered
            .into_iter()
            .filter_map(|id| response.data().get(id))
            .map(|entry| RemovalReason::new(entry.id(), entry.title(), entry.message())),
    );
    reasons
}
