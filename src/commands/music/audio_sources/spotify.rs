//! Implements the `AudioApi` trait for Spotify links.
//! Handles authentication (client credentials flow), URL parsing, and API requests.
//! Spotify tracks are not playable themselves: each one becomes a partial track
//! that is searched on YouTube right before it plays.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use reqwest::header;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serenity::async_trait;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::commands::music::utils::music_manager::MusicError;
use crate::config::SpotifyCredentials;

use super::{AudioApi, AudioSourceResult, TrackMetadata};

const ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const API_URL: &str = "https://api.spotify.com";

/// Regex to match Spotify track, album and playlist links. Group 1 is the kind, group 2 the ID.
static SPOTIFY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?open\.spotify\.com/(?:intl-[a-z]+/)?(track|album|playlist)/([a-zA-Z0-9]+)",
    )
    .unwrap()
});

/// The kind of object a Spotify link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyLink {
    Track(String),
    Album(String),
    Playlist(String),
}

/// Represents basic track information retrieved from Spotify.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: Vec<String>,
    pub duration_ms: u64,
}

impl SpotifyTrack {
    /// The YouTube search query used to find a playable version of the track.
    pub fn search_query(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.artists.join(" "))
        }
    }

    fn into_metadata(self) -> TrackMetadata {
        let query = self.search_query();
        let duration = (self.duration_ms > 0).then(|| Duration::from_millis(self.duration_ms));
        let uploader = (!self.artists.is_empty()).then(|| self.artists.join(", "));

        let mut metadata = TrackMetadata::partial(self.name, query, duration);
        metadata.uploader = uploader;
        metadata
    }
}

#[derive(Debug, Deserialize)]
struct SpotifyToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Considered expired 30 seconds before its actual expiry time.
    fn is_expired(&self) -> bool {
        Instant::now() + Duration::from_secs(30) >= self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TrackObject {
    name: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    #[serde(default)]
    duration_ms: u64,
}

impl From<TrackObject> for SpotifyTrack {
    fn from(track: TrackObject) -> Self {
        Self {
            name: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            duration_ms: track.duration_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    items: Vec<T>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlbumObject {
    tracks: Page<TrackObject>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    track: Option<TrackObject>,
}

/// Spotify Web API client using the client credentials flow.
pub struct SpotifyApi {
    client: reqwest::Client,
    credentials: SpotifyCredentials,
    accounts_url: String,
    api_url: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyApi {
    pub fn new(client: reqwest::Client, credentials: SpotifyCredentials) -> Self {
        Self::with_base_urls(client, credentials, ACCOUNTS_URL, API_URL)
    }

    /// Point the client at other hosts (a local mock server in tests).
    pub fn with_base_urls(
        client: reqwest::Client,
        credentials: SpotifyCredentials,
        accounts_url: &str,
        api_url: &str,
    ) -> Self {
        Self {
            client,
            credentials,
            accounts_url: accounts_url.trim_end_matches('/').to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: Mutex::new(None),
        }
    }

    /// Parse a Spotify link into its kind and ID.
    pub fn parse_link(url: &str) -> Option<SpotifyLink> {
        let captures = SPOTIFY_REGEX.captures(url)?;
        let id = captures.get(2)?.as_str().to_string();
        match captures.get(1)?.as_str() {
            "track" => Some(SpotifyLink::Track(id)),
            "album" => Some(SpotifyLink::Album(id)),
            "playlist" => Some(SpotifyLink::Playlist(id)),
            _ => None,
        }
    }

    pub fn is_spotify_url(url: &str) -> bool {
        Self::parse_link(url).is_some()
    }

    /// Returns a cached access token or requests a new one.
    async fn access_token(&self) -> AudioSourceResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = token_lock.as_ref().filter(|token| !token.is_expired()) {
            return Ok(token.access_token.clone());
        }

        debug!("Requesting a new Spotify access token");
        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let response = self
            .client
            .post(format!("{}/api/token", self.accounts_url))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                MusicError::ExternalApiError(format!("Failed to request Spotify token: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Cannot read response".to_string());
            return Err(MusicError::ExternalApiError(format!(
                "Spotify API error: {} - {}",
                status, text
            )));
        }

        let token = response.json::<SpotifyToken>().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify token: {}", e))
        })?;

        let access_token = token.access_token.clone();
        *token_lock = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });

        Ok(access_token)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AudioSourceResult<T> {
        let token = self.access_token().await?;

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| MusicError::ExternalApiError(format!("Spotify request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MusicError::ExternalApiError(format!(
                "Spotify API error: {}",
                response.status()
            )));
        }

        response.json::<T>().await.map_err(|e| {
            MusicError::ExternalApiError(format!("Failed to parse Spotify response: {}", e))
        })
    }

    /// Fetches a single track by its ID.
    pub async fn get_track(&self, track_id: &str) -> AudioSourceResult<SpotifyTrack> {
        let url = format!("{}/v1/tracks/{}", self.api_url, track_id);
        let track: TrackObject = self.get_json(&url).await?;
        Ok(track.into())
    }

    /// Fetches every track of an album, following pagination.
    pub async fn get_album_tracks(&self, album_id: &str) -> AudioSourceResult<Vec<SpotifyTrack>> {
        let url = format!("{}/v1/albums/{}", self.api_url, album_id);
        let album: AlbumObject = self.get_json(&url).await?;

        let mut tracks: Vec<SpotifyTrack> =
            album.tracks.items.into_iter().map(SpotifyTrack::from).collect();
        let mut next = album.tracks.next;

        while let Some(url) = next {
            let page: Page<TrackObject> = self.get_json(&url).await?;
            tracks.extend(page.items.into_iter().map(SpotifyTrack::from));
            next = page.next;
        }

        Ok(tracks)
    }

    /// Fetches every track of a playlist, following pagination. Removed or
    /// local-only entries (`track: null`) are skipped.
    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
    ) -> AudioSourceResult<Vec<SpotifyTrack>> {
        let mut tracks = Vec::new();
        let mut next = Some(format!(
            "{}/v1/playlists/{}/tracks?limit=100",
            self.api_url, playlist_id
        ));

        while let Some(url) = next {
            let page: Page<PlaylistItem> = self.get_json(&url).await?;
            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .map(SpotifyTrack::from),
            );
            next = page.next;
        }

        Ok(tracks)
    }
}

#[async_trait]
impl AudioApi for SpotifyApi {
    fn is_valid_url(&self, url: &str) -> bool {
        Self::is_spotify_url(url)
    }

    async fn get_metadata(&self, url: &str) -> AudioSourceResult<Vec<TrackMetadata>> {
        let link = Self::parse_link(url)
            .ok_or_else(|| MusicError::AudioSourceError("Invalid Spotify URL".to_string()))?;
        info!("Resolving Spotify link {:?}", link);

        let tracks = match link {
            SpotifyLink::Track(id) => vec![self.get_track(&id).await?],
            SpotifyLink::Album(id) => self.get_album_tracks(&id).await?,
            SpotifyLink::Playlist(id) => self.get_playlist_tracks(&id).await?,
        };

        if tracks.is_empty() {
            return Err(MusicError::AudioSourceError(
                "Spotify link has no tracks".to_string(),
            ));
        }

        Ok(tracks.into_iter().map(SpotifyTrack::into_metadata).collect())
    }
}
