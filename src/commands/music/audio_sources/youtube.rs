//! Implements the `AudioApi` trait for fetching metadata from YouTube.
//! Uses the `yt-dlp` command-line tool for extracting information.

use crate::commands::music::utils::music_manager::MusicError;
use dashmap::DashMap;
use regex::Regex;
use serenity::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use tokio::process::Command;
use tracing::{debug, info};

use super::{AudioApi, AudioSourceResult, TrackMetadata};

/// Matches YouTube watch, playlist and short links. Group 1 holds the path of
/// `www.youtube.com` links.
static YOUTUBE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://(?:www\.|m\.)?youtube\.com/(watch\?v=.*|playlist\?list=.*)|^https://youtu\.be/.+")
        .unwrap()
});

/// What a YouTube URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YoutubeLink {
    Video,
    Playlist,
}

/// Executes `yt-dlp` with the given arguments and returns its stdout.
#[async_trait]
pub trait YtDlpRunner: Send + Sync {
    async fn run(&self, args: Vec<String>) -> AudioSourceResult<String>;
}

/// Runs the real `yt-dlp` binary.
pub struct ProcessRunner {
    program: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl YtDlpRunner for ProcessRunner {
    async fn run(&self, args: Vec<String>) -> AudioSourceResult<String> {
        debug!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MusicError::AudioSourceError(format!("Failed to execute {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("unknown error");
            return Err(MusicError::AudioSourceError(format!(
                "{} failed: {}",
                self.program, reason
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Metadata entries kept before old ones are evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// YouTube lookups through `yt-dlp`, with parsed metadata cached by page URL.
pub struct YoutubeApi {
    runner: Arc<dyn YtDlpRunner>,
    cache: DashMap<String, CachedMetadata>,
    capacity: usize,
    // Insertion counter, the entry with the lowest stamp is evicted first.
    stamp: AtomicU64,
}

struct CachedMetadata {
    metadata: TrackMetadata,
    stamp: u64,
}

impl YoutubeApi {
    pub fn new(runner: Arc<dyn YtDlpRunner>) -> Self {
        Self::with_capacity(runner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(runner: Arc<dyn YtDlpRunner>, capacity: usize) -> Self {
        Self {
            runner,
            cache: DashMap::new(),
            capacity: capacity.max(1),
            stamp: AtomicU64::new(0),
        }
    }

    /// Number of cached metadata entries.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Classify a YouTube URL, `None` when it is not one.
    pub fn classify(url: &str) -> Option<YoutubeLink> {
        let captures = YOUTUBE_REGEX.captures(url)?;
        match captures.get(1) {
            Some(path) if path.as_str().starts_with("playlist") => Some(YoutubeLink::Playlist),
            _ => Some(YoutubeLink::Video),
        }
    }

    /// Checks if the input string is a YouTube video or playlist URL.
    pub fn is_youtube_url(query: &str) -> bool {
        Self::classify(query).is_some()
    }

    /// Fetch metadata of a single video (or any URL `yt-dlp` understands).
    pub async fn from_url(&self, url: &str) -> AudioSourceResult<TrackMetadata> {
        let cached = self.cache.get(url).map(|entry| entry.metadata.clone());
        if let Some(metadata) = cached {
            debug!("Metadata cache hit for {}", url);
            return Ok(metadata);
        }

        info!("Fetching YouTube metadata for URL: {}", url);
        let stdout = self
            .runner
            .run(vec!["-j".into(), "--no-playlist".into(), url.into()])
            .await?;

        let metadata = TrackMetadata::from_ytdlp_output(&stdout)?;
        self.remember(url, &metadata);
        Ok(metadata)
    }

    /// Fetch every entry of a playlist without resolving each video.
    pub async fn from_playlist(&self, url: &str) -> AudioSourceResult<Vec<TrackMetadata>> {
        info!("Fetching YouTube playlist: {}", url);
        let stdout = self
            .runner
            .run(vec!["-J".into(), "--flat-playlist".into(), url.into()])
            .await?;

        let (title, entries) = TrackMetadata::from_ytdlp_playlist(&stdout)?;
        if entries.is_empty() {
            return Err(MusicError::AudioSourceError(format!(
                "Playlist '{}' is empty",
                title
            )));
        }

        debug!("Playlist '{}' has {} entries", title, entries.len());
        Ok(entries)
    }

    /// Fetch metadata of the first YouTube search result for a given search term.
    pub async fn from_search(&self, search_term: &str) -> AudioSourceResult<TrackMetadata> {
        info!("Searching YouTube for: {}", search_term);
        let stdout = self
            .runner
            .run(vec![
                "-j".into(),
                "--no-playlist".into(),
                format!("ytsearch1:{}", search_term),
            ])
            .await?;

        let metadata = TrackMetadata::from_ytdlp_output(&stdout).map_err(|_| {
            MusicError::AudioSourceError(format!("No results found for '{}'", search_term))
        })?;

        if let Some(url) = metadata.url.clone() {
            self.remember(&url, &metadata);
        }
        Ok(metadata)
    }

    /// Resolve the direct audio stream URL of a page, used to feed `ffmpeg`.
    pub async fn stream_url(&self, url: &str) -> AudioSourceResult<String> {
        let stdout = self
            .runner
            .run(vec![
                "-f".into(),
                "bestaudio/best".into(),
                "-g".into(),
                "--no-playlist".into(),
                url.into(),
            ])
            .await?;

        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| MusicError::AudioSourceError(format!("No audio stream for {}", url)))
    }

    fn remember(&self, url: &str, metadata: &TrackMetadata) {
        if self.cache.len() >= self.capacity && !self.cache.contains_key(url) {
            let oldest = self
                .cache
                .iter()
                .min_by_key(|entry| entry.stamp)
                .map(|entry| entry.key().clone());
            if let Some(oldest) = oldest {
                debug!("Evicting {} from the metadata cache", oldest);
                self.cache.remove(&oldest);
            }
        }

        let stamp = self.stamp.fetch_add(1, Ordering::Relaxed);
        self.cache.insert(
            url.to_string(),
            CachedMetadata {
                metadata: metadata.clone(),
                stamp,
            },
        );
    }
}

#[async_trait]
impl AudioApi for YoutubeApi {
    fn is_valid_url(&self, url: &str) -> bool {
        Self::is_youtube_url(url)
    }

    /// Watch links give one track, playlist links every entry.
    async fn get_metadata(&self, url: &str) -> AudioSourceResult<Vec<TrackMetadata>> {
        match Self::classify(url) {
            Some(YoutubeLink::Playlist) => self.from_playlist(url).await,
            _ => Ok(vec![self.from_url(url).await?]),
        }
    }
}
