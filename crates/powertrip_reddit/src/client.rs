//! Reddit modqueue client using reqwest.

use crate::RedditConfig;
use crate::conversions;
use crate::dto::{
    JsonEnvelope, Listing, RemovalMessageBody, RemovalReasonAttach, RemovalReasonsResponse,
    TokenResponse,
};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use powertrip_core::{BanRequest, ItemKind, QueueItem, RemovalMessage, RemovalReason, RemoveOptions};
use powertrip_error::{ConfigError, PowertripResult, SourceError, SourceErrorKind};
use powertrip_interface::SourceQueue;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Tokens are refreshed this long before Reddit expires them.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: u64 = 3600;

/// Items per modqueue page.
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// Reddit moderation queue over the OAuth API.
#[derive(Clone)]
pub struct RedditQueue {
    client: Client,
    config: RedditConfig,
    limiter: Arc<DirectRateLimiter>,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl std::fmt::Debug for RedditQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditQueue")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedditQueue {
    /// Creates a new client. No network traffic happens until the first call.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if pacing is zero or the HTTP client
    /// cannot be initialized.
    #[instrument(skip_all, fields(user = %config.username(), subreddit = %config.subreddit()))]
    pub fn new(config: RedditConfig) -> PowertripResult<Self> {
        let rpm = NonZeroU32::new(*config.requests_per_minute()).ok_or_else(|| {
            ConfigError::new("reddit.requests_per_minute must be greater than zero")
        })?;
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        let client = Client::builder()
            .user_agent(config.user_agent().as_str())
            .timeout(*config.request_timeout())
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))?;

        debug!(rpm = rpm.get(), "Created Reddit client");

        Ok(Self {
            client,
            config,
            limiter,
            token: Arc::new(RwLock::new(None)),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base().trim_end_matches('/'), path)
    }

    /// Cached bearer token, exchanging credentials when stale.
    async fn access_token(&self) -> PowertripResult<String> {
        if let Some(token) = self.token.read().await.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let mut slot = self.token.write().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }
        let token = self.fetch_token().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn fetch_token(&self) -> PowertripResult<AccessToken> {
        self.limiter.until_ready().await;
        let response = self
            .client
            .post(self.config.auth_url())
            .basic_auth(self.config.client_id(), Some(self.config.client_secret()))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username().as_str()),
                ("password", self.config.password().as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Token request failed");
                SourceError::new(SourceErrorKind::Request(format!("access_token: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Token endpoint rejected credentials");
            return Err(SourceError::new(SourceErrorKind::Authentication(format!(
                "token endpoint returned {}",
                status
            )))
            .into());
        }

        let body: TokenResponse = decode("access_token", response).await?;
        if let Some(reason) = body.error() {
            error!(reason = %reason, "Token grant refused");
            return Err(SourceError::new(SourceErrorKind::Authentication(reason.clone())).into());
        }
        let value = body.access_token().clone().ok_or_else(|| {
            SourceError::new(SourceErrorKind::Authentication(
                "token response carried no access_token".to_string(),
            ))
        })?;

        let lifetime = Duration::from_secs(body.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME));
        info!(expires_in_secs = lifetime.as_secs(), "Obtained Reddit access token");
        Ok(AccessToken {
            value,
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_REFRESH_MARGIN),
        })
    }

    /// Paces, authenticates and sends a request, mapping failure statuses.
    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> PowertripResult<Response> {
        let token = self.access_token().await?;
        self.limiter.until_ready().await;

        let response = request.bearer_auth(token).send().await.map_err(|e| {
            warn!(operation, error = ?e, "Reddit request failed");
            SourceError::new(SourceErrorKind::Request(format!("{}: {}", operation, e)))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                if status == StatusCode::UNAUTHORIZED {
                    *self.token.write().await = None;
                }
                error!(operation, status = %status, "Reddit refused authorization");
                Err(SourceError::new(SourceErrorKind::Authentication(format!(
                    "{} returned {}",
                    operation, status
                )))
                .into())
            }
            _ => {
                warn!(operation, status = %status, body = %message, "Reddit API error");
                Err(SourceError::new(SourceErrorKind::Http {
                    status_code: status.as_u16(),
                    message: format!("{} failed: {}", operation, message),
                })
                .into())
            }
        }
    }

    /// POSTs an `api_type=json` form and surfaces errors reported in the body.
    async fn post_json_api(
        &self,
        operation: &'static str,
        path: &str,
        form: &[(&str, &str)],
    ) -> PowertripResult<()> {
        let mut fields = vec![("api_type", "json")];
        fields.extend_from_slice(form);
        let response = self
            .execute(operation, self.client.post(self.url(path)).form(&fields))
            .await?;

        let envelope: JsonEnvelope = decode(operation, response).await?;
        if let Some(first) = envelope.json().errors().first() {
            let detail = first
                .iter()
                .filter_map(|part| part.as_str())
                .collect::<Vec<_>>()
                .join(": ");
            warn!(operation, detail = %detail, "Reddit rejected request");
            return Err(SourceError::new(SourceErrorKind::Rejected(format!(
                "{}: {}",
                operation, detail
            )))
            .into());
        }
        Ok(())
    }

    async fn post_fullname(
        &self,
        operation: &'static str,
        path: &str,
        item: &QueueItem,
    ) -> PowertripResult<()> {
        let fullname = item.fullname();
        self.execute(
            operation,
            self.client
                .post(self.url(path))
                .form(&[("id", fullname.as_str())]),
        )
        .await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(
    operation: &'static str,
    response: Response,
) -> PowertripResult<T> {
    let text = response.text().await.map_err(|e| {
        SourceError::new(SourceErrorKind::Request(format!(
            "{}: failed to read body: {}",
            operation, e
        )))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        error!(operation, error = ?e, "Failed to parse Reddit response");
        SourceError::new(SourceErrorKind::Decode(format!("{}: {}", operation, e))).into()
    })
}

#[async_trait]
impl SourceQueue for RedditQueue {
    #[instrument(skip(self), fields(subreddit = %self.config.subreddit()))]
    async fn list_queue(&self) -> PowertripResult<Vec<QueueItem>> {
        let path = format!("/r/{}/about/modqueue", self.config.subreddit());
        let mut items = Vec::new();
        let mut after: Option<String> = None;
        let limit = PAGE_SIZE.to_string();

        for page in 0..*self.config.max_pages() {
            let mut query = vec![("limit", limit.as_str()), ("raw_json", "1")];
            if let Some(cursor) = after.as_deref() {
                query.push(("after", cursor));
            }
            let response = self
                .execute("list_queue", self.client.get(self.url(&path)).query(&query))
                .await?;
            let listing: Listing = decode("list_queue", response).await?;
            items.extend(conversions::queue_from_listing(&listing)?);

            match listing.data().after() {
                Some(next) => after = Some(next.clone()),
                None => {
                    debug!(pages = page + 1, count = items.len(), "Fetched modqueue");
                    return Ok(items);
                }
            }
        }

        warn!(
            max_pages = self.config.max_pages(),
            count = items.len(),
            "Modqueue listing truncated"
        );
        Ok(items)
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()))]
    async fn approve(&self, item: &QueueItem) -> PowertripResult<()> {
        self.post_fullname("approve", "/api/approve", item).await
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()))]
    async fn unlock(&self, item: &QueueItem) -> PowertripResult<()> {
        self.post_fullname("unlock", "/api/unlock", item).await
    }

    #[instrument(skip(self, item, options), fields(item_id = %item.id(), reason = ?options.reason_id))]
    async fn remove(&self, item: &QueueItem, options: &RemoveOptions) -> PowertripResult<()> {
        let fullname = item.fullname();
        self.execute(
            "remove",
            self.client
                .post(self.url("/api/remove"))
                .form(&[("id", fullname.as_str()), ("spam", "false")]),
        )
        .await?;

        if options.is_plain() {
            return Ok(());
        }

        let attach = RemovalReasonAttach {
            item_ids: vec![fullname],
            mod_note: options.mod_note.as_deref(),
            reason_id: options.reason_id.as_deref(),
        };
        let json = serde_json::to_string(&attach).map_err(|e| {
            SourceError::new(SourceErrorKind::Decode(format!(
                "Failed to encode removal reason: {}",
                e
            )))
        })?;
        self.execute(
            "remove_reason",
            self.client
                .post(self.url("/api/v1/modactions/removal_reasons"))
                .form(&[("json", json.as_str())]),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, item, message), fields(item_id = %item.id()))]
    async fn send_removal_message(
        &self,
        item: &QueueItem,
        message: &RemovalMessage,
    ) -> PowertripResult<()> {
        let path = match item.kind() {
            ItemKind::Comment { .. } => "/api/v1/modactions/removal_comment_message",
            ItemKind::Submission { .. } => "/api/v1/modactions/removal_link_message",
        };
        let body = RemovalMessageBody {
            item_id: item.fullname(),
            message: &message.message,
            title: &message.title,
            kind: "private",
        };
        self.execute(
            "send_removal_message",
            self.client.post(self.url(path)).json(&body),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, request), fields(subreddit = %request.subreddit(), duration = %request.duration()))]
    async fn ban_author(&self, request: &BanRequest) -> PowertripResult<()> {
        let path = format!("/r/{}/api/friend", request.subreddit());
        let days = request.duration().days().map(|d| d.to_string());

        let mut form: Vec<(&str, &str)> = vec![
            ("type", "banned"),
            ("name", request.author().as_str()),
            ("note", request.note().as_str()),
            ("ban_context", request.context().as_str()),
        ];
        if let Some(message) = request.ban_message() {
            form.push(("ban_message", message.as_str()));
        }
        if let Some(reason) = request.ban_reason() {
            form.push(("ban_reason", reason.as_str()));
        }
        if let Some(days) = days.as_deref() {
            form.push(("duration", days));
        }
        self.post_json_api("ban_author", &path, &form).await
    }

    #[instrument(skip(self))]
    async fn removal_reasons(&self, subreddit: &str) -> PowertripResult<Vec<RemovalReason>> {
        let path = format!("/api/v1/{}/removal_reasons", subreddit);
        let response = self
            .execute(
                "removal_reasons",
                self.client.get(self.url(&path)).query(&[("raw_json", "1")]),
            )
            .await?;
        let body: RemovalReasonsResponse = decode("removal_reasons", response).await?;
        let reasons = conversions::removal_reasons(&body);
        debug!(count = reasons.len(), "Fetched removal reasons");
        Ok(reasons)
    }

    fn platform_name(&self) -> &'static str {
        "reddit"
    }
}
