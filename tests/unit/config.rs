use std::collections::HashMap;
use std::time::Duration;

use crate::common::fixtures::base_env;
use crate::{assert_eq, assert_matches, test_case};
use notorious::config::{BotConfig, ConfigError};

fn load(extra: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
    let mut env: HashMap<String, String> = base_env();
    for (key, value) in extra {
        env.insert(key.to_string(), value.to_string());
    }
    BotConfig::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_full_environment() {
    let config = load(&[
        ("COMMAND_PREFIX", "?"),
        ("SPOTIFY_CLIENT_ID", "id"),
        ("SPOTIFY_CLIENT_SECRET", "secret"),
        ("SKIP_VOTE_THRESHOLD", "5"),
        ("IDLE_TIMEOUT_SECS", "60"),
        ("DEFAULT_VOLUME", "250"),
        ("DATABASE_PATH", "/tmp/music.db"),
    ])
    .unwrap();

    assert_eq!(config.command_prefix, "?");
    assert!(config.spotify.is_some());
    assert_eq!(config.skip_vote_threshold, 5);
    assert_eq!(config.idle_timeout, Some(Duration::from_secs(60)));
    assert_eq!(config.default_volume, 250);
    assert_eq!(config.database_path.to_str(), Some("/tmp/music.db"));
}

#[test_case("DEFAULT_VOLUME", "301"; "volume above range")]
#[test_case("SKIP_VOTE_THRESHOLD", "0"; "zero votes")]
fn test_out_of_range(key: &str, value: &str) {
    assert_matches!(load(&[(key, value)]), Err(ConfigError::OutOfRange { .. }));
}

#[test_case("DEFAULT_VOLUME", "loud"; "volume")]
#[test_case("IDLE_TIMEOUT_SECS", "-1"; "negative timeout")]
fn test_invalid_numbers(key: &str, value: &str) {
    assert_matches!(load(&[(key, value)]), Err(ConfigError::Invalid { .. }));
}

#[test]
fn test_summary_never_leaks_secrets() {
    let config = load(&[("SPOTIFY_CLIENT_SECRET", "hunter2"), ("SPOTIFY_CLIENT_ID", "id")]).unwrap();
    let summary = config.summary();
    assert!(!summary.contains("token"));
    assert!(!summary.contains("hunter2"));
}
