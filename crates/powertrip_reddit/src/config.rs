//! Reddit client configuration.

use derive_builder::Builder;
use derive_getters::Getters;
use std::time::Duration;

/// OAuth token endpoint for script applications.
pub const DEFAULT_AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Base url for authenticated API calls.
pub const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

/// Credentials and tuning for [`RedditQueue`](crate::RedditQueue).
#[derive(Clone, Builder, Getters)]
#[builder(setter(into))]
pub struct RedditConfig {
    /// Script application client id
    client_id: String,
    /// Script application secret
    client_secret: String,
    /// Moderator account name
    username: String,
    /// Moderator account password
    password: String,
    /// User-Agent header sent with every request
    user_agent: String,
    /// Subreddit whose modqueue is mirrored (`mod` covers every moderated sub)
    #[builder(default = "\"mod\".to_string()")]
    subreddit: String,
    /// Request pacing
    #[builder(default = "60")]
    requests_per_minute: u32,
    /// Per-request timeout
    #[builder(default = "Duration::from_secs(30)")]
    request_timeout: Duration,
    /// Most modqueue pages fetched per listing
    #[builder(default = "10")]
    max_pages: usize,
    /// Token endpoint
    #[builder(default = "DEFAULT_AUTH_URL.to_string()")]
    auth_url: String,
    /// API base url
    #[builder(default = "DEFAULT_API_BASE.to_string()")]
    api_base: String,
}

impl RedditConfig {
    /// Creates a new builder for `RedditConfig`.
    pub fn builder() -> RedditConfigBuilder {
        RedditConfigBuilder::default()
    }
}

impl std::fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditConfig")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .field("subreddit", &self.subreddit)
            .field("requests_per_minute", &self.requests_per_minute)
            .field("request_timeout", &self.request_timeout)
            .field("max_pages", &self.max_pages)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}
