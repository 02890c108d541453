//! Defines the `TrackMetadata` struct, a unified representation of track information
//! from the audio sources, and the conversion from `yt-dlp` JSON output.

use crate::commands::music::utils::music_manager::MusicError;
use serde_json::Value;
use std::time::Duration;

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The page URL of the track (e.g., YouTube watch URL). `None` for partial tracks.
    pub url: Option<String>,
    /// The duration of the track, if known.
    pub duration: Option<Duration>,
    /// URL to a thumbnail image for the track, if available.
    pub thumbnail: Option<String>,
    /// Channel or artist that published the track.
    pub uploader: Option<String>,
    /// Link to the uploader's page.
    pub uploader_url: Option<String>,
    /// Search query used to find a playable version of a partial track
    /// (e.g., a Spotify entry) right before it plays.
    pub search_query: Option<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: None,
            duration: None,
            thumbnail: None,
            uploader: None,
            uploader_url: None,
            search_query: None,
        }
    }
}

impl TrackMetadata {
    /// A track known only by a search query, resolved when it is about to play.
    pub fn partial(title: String, search_query: String, duration: Option<Duration>) -> Self {
        Self {
            title,
            duration,
            search_query: Some(search_query),
            ..Default::default()
        }
    }

    /// Whether the track still needs to be resolved to a playable URL.
    pub fn is_partial(&self) -> bool {
        self.url.is_none() && self.search_query.is_some()
    }

    /// Parse a single `yt-dlp -j` document (or a flat-playlist entry).
    pub fn from_ytdlp_json(json: &Value) -> Result<Self, MusicError> {
        if !json.is_object() {
            return Err(MusicError::AudioSourceError(
                "Unexpected yt-dlp output".to_string(),
            ));
        }

        let title = json["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string();

        // Full extractions carry `webpage_url`; flat-playlist entries only `url`.
        let url = json["webpage_url"]
            .as_str()
            .or_else(|| json["url"].as_str())
            .map(str::to_string)
            .or_else(|| {
                json["id"]
                    .as_str()
                    .map(|id| format!("https://www.youtube.com/watch?v={}", id))
            });

        let duration = json["duration"]
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64);

        let thumbnail = json["thumbnail"].as_str().map(str::to_string).or_else(|| {
            json["thumbnails"]
                .as_array()
                .and_then(|thumbs| thumbs.last())
                .and_then(|thumb| thumb["url"].as_str())
                .map(str::to_string)
        });

        let uploader = json["uploader"]
            .as_str()
            .or_else(|| json["channel"].as_str())
            .map(str::to_string);

        let uploader_url = json["uploader_url"]
            .as_str()
            .or_else(|| json["channel_url"].as_str())
            .map(str::to_string);

        Ok(Self {
            title,
            url,
            duration,
            thumbnail,
            uploader,
            uploader_url,
            search_query: None,
        })
    }

    /// Parse the raw stdout of `yt-dlp -j`. Search results may print one JSON
    /// document per line; the first one wins.
    pub fn from_ytdlp_output(stdout: &str) -> Result<Self, MusicError> {
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| MusicError::AudioSourceError("No results found".to_string()))?;

        let json: Value = serde_json::from_str(line).map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
        })?;

        Self::from_ytdlp_json(&json)
    }

    /// Parse the raw stdout of `yt-dlp -J --flat-playlist` into its entries.
    pub fn from_ytdlp_playlist(stdout: &str) -> Result<(String, Vec<Self>), MusicError> {
        let json: Value = serde_json::from_str(stdout).map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to parse playlist metadata: {}", e))
        })?;

        let playlist_title = json["title"].as_str().unwrap_or("Playlist").to_string();

        let entries = json["entries"]
            .as_array()
            .ok_or_else(|| MusicError::AudioSourceError("Playlist has no entries".to_string()))?
            .iter()
            .filter(|entry| !entry.is_null())
            .map(Self::from_ytdlp_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((playlist_title, entries))
    }
}
