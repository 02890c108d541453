//! A Discord music bot: voice channel control, a per-guild song queue with
//! loop and vote-skip, and playback through songbird fed by `yt-dlp`.

use std::sync::{Arc, LazyLock};

pub mod commands;
pub mod config;
pub mod utils;

use commands::music::audio_sources::AudioSources;
use config::BotConfig;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Shared HTTP client for songbird inputs and the Spotify API.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// User data, stored and accessible in all command invocations
pub struct Data {
    pub config: Arc<BotConfig>,
    pub sources: Arc<AudioSources>,
}

impl Data {
    pub fn new(config: BotConfig) -> Self {
        let config = Arc::new(config);
        let sources = Arc::new(AudioSources::from_config(&config));
        Self { config, sources }
    }
}
