//! Reddit moderation queue client for PowerTrip.
//!
//! [`RedditQueue`] implements [`SourceQueue`](powertrip_interface::SourceQueue)
//! against the OAuth API of a script application:
//!
//! - password-grant tokens, cached until shortly before expiry
//! - request pacing with a `governor` limiter
//! - modqueue pagination through `after` cursors
//! - approve, unlock, remove (with note and removal reason), removal
//!   messages and bans
//!
//! # Example
//!
//! ```rust,ignore
//! use powertrip_reddit::{RedditConfig, RedditQueue};
//! use powertrip_interface::SourceQueue;
//!
//! let config = RedditConfig::builder()
//!     .client_id("id")
//!     .client_secret("secret")
//!     .username("modbot")
//!     .password("hunter2")
//!     .user_agent("powertrip/0.2 (by u/modbot)")
//!     .build()?;
//! let reddit = RedditQueue::new(config)?;
//! let queue = reddit.list_queue().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod conversions;
mod dto;

pub use client::{PAGE_SIZE, RedditQueue};
pub use config::{DEFAULT_API_BASE, DEFAULT_AUTH_URL, RedditConfig, RedditConfigBuilder};
