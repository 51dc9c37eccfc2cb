//! Layered process configuration.
//!
//! Sources, lowest precedence first:
//! 1. Bundled defaults (include_str! from powertrip.toml)
//! 2. User file: `~/.config/powertrip/powertrip.toml` then `./powertrip.toml`,
//!    or only the file passed with `--config`
//! 3. `PT_` environment variables, `__` between section and key
//!    (`PT_DISCORD__TOKEN`, `PT_ACTIONS__BAN_DURATIONS=3,7`)
//! 4. Legacy variables `pt_token`, `pt_queue_channel`, `pt_log_channel` and
//!    `pt_ban_durations`

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use derive_getters::Getters;
use powertrip_core::{ActionCapabilities, KindTag, MAX_BAN_DURATIONS};
use powertrip_discord::DiscordConfig;
use powertrip_error::{ConfigError, PowertripResult};
use powertrip_queue::{DispatcherConfig, StreamConfig};
use powertrip_reddit::{PAGE_SIZE, RedditConfig};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../powertrip.toml");

/// Longest temporary ban Reddit accepts, in days.
pub const MAX_BAN_DAYS: i64 = 999;

/// Keys split on commas when they come from `PT_` variables.
const LIST_KEYS: [&str; 3] = [
    "actions.ban_durations",
    "actions.reasons_for",
    "actions.bans_for",
];

/// `[discord]` section.
#[derive(Clone, Deserialize, Getters)]
pub struct DiscordSettings {
    /// Bot token
    token: String,
    /// Channel holding the mirrors
    queue_channel: u64,
    /// Audit channel; absent or zero disables audit lines
    #[serde(default)]
    log_channel: Option<u64>,
    /// Most recent messages inspected per listing
    history_limit: usize,
}

/// `[reddit]` section.
#[derive(Clone, Deserialize, Getters)]
pub struct RedditSettings {
    /// Script application client id
    client_id: String,
    /// Script application secret
    client_secret: String,
    /// Moderator account name
    username: String,
    /// Moderator account password
    password: String,
    /// User-Agent header
    user_agent: String,
    /// Subreddit whose modqueue is mirrored
    subreddit: String,
    /// Request pacing
    requests_per_minute: u32,
    /// Per-request timeout
    request_timeout_secs: u64,
    /// Most modqueue pages fetched per listing
    max_pages: usize,
    /// Token endpoint override
    #[serde(default)]
    auth_url: Option<String>,
    /// API base override
    #[serde(default)]
    api_base: Option<String>,
}

/// `[stream]` section.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct StreamSettings {
    /// Delay between ticks
    tick_interval_secs: u64,
    /// Wait after a transient failure
    cooldown_secs: u64,
    /// Bound on each backend call
    call_timeout_secs: u64,
}

/// `[actions]` section.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct ActionSettings {
    /// Temporary ban lengths in days
    ban_durations: Vec<i64>,
    /// Kinds offering removal reasons
    reasons_for: Vec<KindTag>,
    /// Kinds offering bans
    bans_for: Vec<KindTag>,
    /// Link an excerpt of the item in ban messages
    ban_message_excerpt: bool,
    /// Send the removal reason's message to the author
    send_removal_messages: bool,
    /// Pause before deleting an actioned mirror
    settle_delay_ms: u64,
    /// Completed claims remembered by the dispatcher
    completed_claims: usize,
}

/// Every setting the mirror process reads.
///
/// # Example
///
/// ```no_run
/// use powertrip::PowertripSettings;
///
/// let settings = PowertripSettings::load(None)?;
/// let stream = settings.stream_config()?;
/// # Ok::<(), powertrip_error::PowertripError>(())
/// ```
#[derive(Clone, Deserialize, Getters)]
pub struct PowertripSettings {
    /// Discord connection
    discord: DiscordSettings,
    /// Reddit connection
    reddit: RedditSettings,
    /// Stream timing
    stream: StreamSettings,
    /// Moderation actions
    actions: ActionSettings,
}

// Opaque so the secrets in the discord and reddit sections never reach logs.
impl std::fmt::Debug for PowertripSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowertripSettings").finish_non_exhaustive()
    }
}

impl PowertripSettings {
    /// Load from every source using the process environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source is unreadable, a value has
    /// the wrong type, or validation fails.
    pub fn load(path: Option<&Path>) -> PowertripResult<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::load_from(path, &env)
    }

    /// Load from every source using `env` in place of the process
    /// environment.
    pub fn load_from(path: Option<&Path>, env: &HashMap<String, String>) -> PowertripResult<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Loading configuration file");
                builder = builder.add_source(File::from(path));
            }
            None => {
                if let Some(config_dir) = dirs::config_dir() {
                    let user_config = config_dir.join("powertrip/powertrip.toml");
                    builder = builder.add_source(File::from(user_config).required(false));
                }
                builder = builder.add_source(File::with_name("powertrip").required(false));
            }
        }

        let mut environment = Environment::with_prefix("PT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment.source(Some(
            env.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )));

        builder = apply_legacy(builder, env)?;

        let settings: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to read configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check every value, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing each problem.
    pub fn validate(&self) -> PowertripResult<()> {
        let mut problems = Vec::new();

        if self.discord.token.trim().is_empty() {
            problems.push("discord.token is missing".to_string());
        }
        if self.discord.queue_channel == 0 {
            problems.push("discord.queue_channel is missing".to_string());
        }
        if self.discord.history_limit == 0 {
            problems.push("discord.history_limit must be greater than zero".to_string());
        }

        for (name, value) in [
            ("reddit.client_id", &self.reddit.client_id),
            ("reddit.client_secret", &self.reddit.client_secret),
            ("reddit.username", &self.reddit.username),
            ("reddit.password", &self.reddit.password),
            ("reddit.user_agent", &self.reddit.user_agent),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{} is missing", name));
            }
        }

        for (name, value) in [
            ("reddit.requests_per_minute", u64::from(self.reddit.requests_per_minute)),
            ("reddit.request_timeout_secs", self.reddit.request_timeout_secs),
            ("reddit.max_pages", self.reddit.max_pages as u64),
            ("stream.tick_interval_secs", self.stream.tick_interval_secs),
            ("stream.cooldown_secs", self.stream.cooldown_secs),
            ("stream.call_timeout_secs", self.stream.call_timeout_secs),
            ("actions.completed_claims", self.actions.completed_claims as u64),
        ] {
            if value == 0 {
                problems.push(format!("{} must be greater than zero", name));
            }
        }

        let queue_capacity = self.reddit.max_pages.saturating_mul(PAGE_SIZE);
        if self.discord.history_limit < queue_capacity {
            problems.push(format!(
                "discord.history_limit ({}) must cover reddit.max_pages * {} ({})",
                self.discord.history_limit, PAGE_SIZE, queue_capacity
            ));
        }

        for days in &self.actions.ban_durations {
            if !(1..=MAX_BAN_DAYS).contains(days) {
                problems.push(format!(
                    "ban duration {} is outside 1..={} days",
                    days, MAX_BAN_DAYS
                ));
            }
        }
        let mut distinct = HashSet::new();
        let repeated: BTreeSet<i64> = self
            .actions
            .ban_durations
            .iter()
            .filter(|days| !distinct.insert(**days))
            .copied()
            .collect();
        for days in repeated {
            problems.push(format!("ban duration {} is listed more than once", days));
        }
        if self.actions.ban_durations.len() > MAX_BAN_DURATIONS {
            problems.push(format!(
                "{} ban durations configured, at most {} fit on a mirror",
                self.actions.ban_durations.len(),
                MAX_BAN_DURATIONS
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::new(format!("Invalid configuration: {}", problems.join("; "))).into())
        }
    }

    /// Settings for the Discord client.
    pub fn discord_config(&self) -> PowertripResult<DiscordConfig> {
        let config = DiscordConfig::builder()
            .token(self.discord.token.clone())
            .queue_channel(self.discord.queue_channel)
            .log_channel(self.discord.log_channel.filter(|id| *id != 0))
            .history_limit(self.discord.history_limit)
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid Discord settings: {}", e)))?;
        Ok(config)
    }

    /// Settings for the Reddit client.
    pub fn reddit_config(&self) -> PowertripResult<RedditConfig> {
        let reddit = &self.reddit;
        let mut builder = RedditConfig::builder();
        builder
            .client_id(reddit.client_id.clone())
            .client_secret(reddit.client_secret.clone())
            .username(reddit.username.clone())
            .password(reddit.password.clone())
            .user_agent(reddit.user_agent.clone())
            .subreddit(reddit.subreddit.clone())
            .requests_per_minute(reddit.requests_per_minute)
            .request_timeout(Duration::from_secs(reddit.request_timeout_secs))
            .max_pages(reddit.max_pages);
        if let Some(auth_url) = &reddit.auth_url {
            builder.auth_url(auth_url.clone());
        }
        if let Some(api_base) = &reddit.api_base {
            builder.api_base(api_base.clone());
        }
        let config = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid Reddit settings: {}", e)))?;
        Ok(config)
    }

    /// Timing of the reconciliation stream.
    pub fn stream_config(&self) -> PowertripResult<StreamConfig> {
        let config = StreamConfig::builder()
            .tick_interval(Duration::from_secs(self.stream.tick_interval_secs))
            .cooldown(Duration::from_secs(self.stream.cooldown_secs))
            .call_timeout(Duration::from_secs(self.stream.call_timeout_secs))
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid stream settings: {}", e)))?;
        Ok(config)
    }

    /// Behaviour of the action dispatcher.
    pub fn dispatcher_config(&self) -> PowertripResult<DispatcherConfig> {
        let actions = &self.actions;
        let ban_durations = actions
            .ban_durations
            .iter()
            .map(|days| {
                u16::try_from(*days)
                    .map_err(|_| ConfigError::new(format!("ban duration {} is out of range", days)))
            })
            .collect::<Result<Vec<u16>, ConfigError>>()?;

        let capabilities = ActionCapabilities::builder()
            .reasons_for(actions.reasons_for.clone())
            .bans_for(actions.bans_for.clone())
            .ban_durations(ban_durations)
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid action settings: {}", e)))?;

        let config = DispatcherConfig::builder()
            .capabilities(capabilities)
            .ban_message_excerpt(actions.ban_message_excerpt)
            .send_removal_messages(actions.send_removal_messages)
            .settle_delay(Duration::from_millis(actions.settle_delay_ms))
            .completed_claims(actions.completed_claims)
            .call_timeout(Duration::from_secs(self.stream.call_timeout_secs))
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid action settings: {}", e)))?;
        Ok(config)
    }
}

/// Look up a legacy variable, accepting either case.
fn legacy<'a>(env: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    env.get(name)
        .or_else(|| env.get(&name.to_uppercase()))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn parse_id(name: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .map_err(|e| ConfigError::new(format!("{} is not a channel id: {}", name, e)))
}

/// Parse a comma separated list of ban lengths.
pub fn parse_ban_durations(value: &str) -> Result<Vec<i64>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>().map_err(|e| {
                ConfigError::new(format!("ban duration '{}' is not a number: {}", part, e))
            })
        })
        .collect()
}

fn apply_legacy(
    builder: ConfigBuilder<DefaultState>,
    env: &HashMap<String, String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let overridden = |e: config::ConfigError| {
        ConfigError::new(format!("Failed to apply legacy variable: {}", e))
    };
    let mut builder = builder;

    if let Some(token) = legacy(env, "pt_token") {
        builder = builder
            .set_override("discord.token", token)
            .map_err(overridden)?;
    }
    if let Some(channel) = legacy(env, "pt_queue_channel") {
        builder = builder
            .set_override("discord.queue_channel", parse_id("pt_queue_channel", channel)?)
            .map_err(overridden)?;
    }
    if let Some(channel) = legacy(env, "pt_log_channel") {
        builder = builder
            .set_override("discord.log_channel", parse_id("pt_log_channel", channel)?)
            .map_err(overridden)?;
    }
    if let Some(durations) = legacy(env, "pt_ban_durations") {
        builder = builder
            .set_override("actions.ban_durations", parse_ban_durations(durations)?)
            .map_err(overridden)?;
    }
    Ok(builder)
}
