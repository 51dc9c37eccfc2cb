//! Shared fixtures for Reddit client tests.

#![allow(dead_code)]

use chrono::DateTime;
use powertrip_core::{ItemKind, QueueItem};
use powertrip_reddit::{RedditConfig, RedditQueue};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";

/// Client pointed at the mock server for both auth and API calls.
pub fn client_for(server: &MockServer) -> RedditQueue {
    let config = RedditConfig::builder()
        .client_id("client")
        .client_secret("secret")
        .username("modbot")
        .password("hunter2")
        .user_agent("powertrip-tests/0.2")
        .auth_url(format!("{}/api/v1/access_token", server.uri()))
        .api_base(server.uri())
        .build()
        .unwrap();
    RedditQueue::new(config).unwrap()
}

/// Token endpoint expected to be hit `times` times.
pub async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .expect(times)
        .mount(server)
        .await;
}

pub fn listing(children: serde_json::Value, after: Option<&str>) -> serde_json::Value {
    json!({ "kind": "Listing", "data": { "after": after, "children": children } })
}

pub fn comment_thing(id: &str, created: i64) -> serde_json::Value {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "subreddit": "rust",
            "author": "ferris",
            "permalink": format!("/r/rust/comments/abc/title/{}/", id),
            "created_utc": created as f64,
            "body": format!("comment {}", id)
        }
    })
}

pub fn comment(id: &str) -> QueueItem {
    QueueItem::builder()
        .id(id)
        .kind(ItemKind::Comment {
            body: format!("comment {}", id),
        })
        .subreddit("rust")
        .author(Some("ferris".to_string()))
        .permalink(format!("/r/rust/comments/abc/title/{}/", id))
        .created_at(DateTime::from_timestamp(1_700_000_000, 0).unwrap())
        .build()
        .unwrap()
}
