//! Environment-driven bot settings.
//!
//! Everything is read once at start-up (after `.env` has been loaded) and shared
//! behind an `Arc` with the command handlers and the playback event handlers.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while reading the bot configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Client credentials for the Spotify Web API.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Runtime settings of the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub command_prefix: String,
    pub spotify: Option<SpotifyCredentials>,
    pub ytdlp_path: String,
    pub ffmpeg_path: String,
    pub skip_vote_threshold: usize,
    /// `None` disables the idle disconnect.
    pub idle_timeout: Option<Duration>,
    pub default_volume: u16,
    pub database_path: PathBuf,
}

pub const MAX_VOLUME: u16 = 300;

impl BotConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = non_empty("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let spotify = match (
            non_empty("SPOTIFY_CLIENT_ID"),
            non_empty("SPOTIFY_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        let idle_secs: u64 = parse_or("IDLE_TIMEOUT_SECS", non_empty("IDLE_TIMEOUT_SECS"), 180)?;

        let config = Self {
            discord_token,
            command_prefix: non_empty("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string()),
            spotify,
            ytdlp_path: non_empty("YTDLP_PATH").unwrap_or_else(|| "yt-dlp".to_string()),
            ffmpeg_path: non_empty("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            skip_vote_threshold: parse_or(
                "SKIP_VOTE_THRESHOLD",
                non_empty("SKIP_VOTE_THRESHOLD"),
                3,
            )?,
            idle_timeout: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),
            default_volume: parse_or("DEFAULT_VOLUME", non_empty("DEFAULT_VOLUME"), 100)?,
            database_path: non_empty("DATABASE_PATH")
                .unwrap_or_else(|| "application_data.db".to_string())
                .into(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Range checks that parsing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_volume > MAX_VOLUME {
            return Err(ConfigError::OutOfRange {
                name: "DEFAULT_VOLUME",
                value: self.default_volume as u64,
                min: 0,
                max: MAX_VOLUME as u64,
            });
        }

        if self.skip_vote_threshold == 0 {
            return Err(ConfigError::OutOfRange {
                name: "SKIP_VOTE_THRESHOLD",
                value: 0,
                min: 1,
                max: usize::MAX as u64,
            });
        }

        Ok(())
    }

    /// One-line summary for the start-up log; never includes secrets.
    pub fn summary(&self) -> String {
        format!(
            "prefix={:?} spotify={} yt-dlp={} ffmpeg={} skip_votes={} idle_timeout={:?} volume={}% db={}",
            self.command_prefix,
            self.spotify.is_some(),
            self.ytdlp_path,
            self.ffmpeg_path,
            self.skip_vote_threshold,
            self.idle_timeout,
            self.default_volume,
            self.database_path.display(),
        )
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
