//! Shared fixtures for settings tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

/// A file holding the Reddit credentials and nothing else.
pub const REDDIT_ONLY: &str = r#"
[reddit]
client_id = "client"
client_secret = "secret"
username = "modbot"
password = "hunter2"
"#;

/// A complete minimal configuration.
pub const MINIMAL: &str = r#"
[discord]
token = "discord-token"
queue_channel = 1001

[reddit]
client_id = "client"
client_secret = "secret"
username = "modbot"
password = "hunter2"
"#;

/// Write `contents` to a per-test TOML file under the temp dir.
pub fn write_config(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("powertrip-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.toml", name));
    std::fs::write(&path, contents).unwrap();
    path
}

pub fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
