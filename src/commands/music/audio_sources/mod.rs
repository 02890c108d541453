//! This module defines the structure and traits for handling the audio sources.
//! It includes implementations for YouTube (through `yt-dlp`) and Spotify (when
//! credentials are configured), and turns a user query into queueable tracks.

/// Builds songbird inputs, including the `ffmpeg` equalizer pipeline.
pub mod input;
/// Implements the `AudioApi` trait for Spotify.
pub mod spotify;
/// Defines the `TrackMetadata` struct used across audio sources.
pub mod track_metadata;
/// Implements the `AudioApi` trait for YouTube.
pub mod youtube;

use crate::HTTP_CLIENT;
use crate::commands::music::utils::music_manager::MusicError;
use crate::config::BotConfig;
use serenity::async_trait;
use spotify::SpotifyApi;
use std::sync::Arc;
use tracing::info;
use url::Url;
use youtube::{ProcessRunner, YoutubeApi};

pub use track_metadata::TrackMetadata;

/// A specialized `Result` type for operations within the `audio_sources` module.
pub type AudioSourceResult<T> = Result<T, MusicError>;

/// Common interface of the URL-based audio APIs.
#[async_trait]
pub trait AudioApi: Send + Sync {
    /// Checks if the given URL is recognized by this API.
    fn is_valid_url(&self, url: &str) -> bool;

    /// Fetches metadata for one or more tracks from the given URL.
    async fn get_metadata(&self, url: &str) -> AudioSourceResult<Vec<TrackMetadata>>;
}

/// Performs a basic check if the input string is an http(s) URL.
pub fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// The audio sources available to the bot.
pub struct AudioSources {
    pub youtube: YoutubeApi,
    spotify: Option<SpotifyApi>,
    ytdlp_program: &'static str,
    ffmpeg_program: String,
}

impl AudioSources {
    pub fn new(
        youtube: YoutubeApi,
        spotify: Option<SpotifyApi>,
        ytdlp_program: &str,
        ffmpeg_program: &str,
    ) -> Self {
        Self {
            youtube,
            spotify,
            // songbird wants a 'static program name; this is built once per process.
            ytdlp_program: Box::leak(ytdlp_program.to_string().into_boxed_str()),
            ffmpeg_program: ffmpeg_program.to_string(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        let runner = Arc::new(ProcessRunner::new(config.ytdlp_path.clone()));
        let spotify = config
            .spotify
            .clone()
            .map(|credentials| SpotifyApi::new(HTTP_CLIENT.clone(), credentials));

        Self::new(
            YoutubeApi::new(runner),
            spotify,
            &config.ytdlp_path,
            &config.ffmpeg_path,
        )
    }

    /// Turn a `play` query into one or more tracks.
    ///
    /// Spotify links need configured credentials, YouTube links go through the
    /// YouTube API, other URLs are handed to `yt-dlp` as-is and anything else
    /// is a YouTube search for the first result.
    pub async fn resolve(&self, query: &str) -> AudioSourceResult<Vec<TrackMetadata>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(MusicError::AudioSourceError(
                "Nothing to search for".to_string(),
            ));
        }

        if SpotifyApi::is_spotify_url(query) {
            let spotify = self.spotify.as_ref().ok_or_else(|| {
                MusicError::ConfigError("Spotify credentials are not configured".to_string())
            })?;
            return spotify.get_metadata(query).await;
        }

        if self.youtube.is_valid_url(query) {
            return self.youtube.get_metadata(query).await;
        }

        if is_url(query) {
            info!("Handing unrecognised URL to yt-dlp: {}", query);
            return Ok(vec![self.youtube.from_url(query).await?]);
        }

        Ok(vec![self.youtube.from_search(query).await?])
    }

    /// Resolve a partial track to a playable one; complete tracks pass through.
    pub async fn resolve_partial(&self, metadata: TrackMetadata) -> AudioSourceResult<TrackMetadata> {
        match metadata.search_query.as_deref() {
            Some(query) if metadata.is_partial() => {
                let mut found = self.youtube.from_search(query).await?;
                // Keep the Spotify duration if YouTube did not report one.
                found.duration = found.duration.or(metadata.duration);
                Ok(found)
            }
            _ => Ok(metadata),
        }
    }

    pub fn ytdlp_program(&self) -> &'static str {
        self.ytdlp_program
    }

    pub fn ffmpeg_program(&self) -> &str {
        &self.ffmpeg_program
    }
}
