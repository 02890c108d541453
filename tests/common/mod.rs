//! Common test utilities, fixtures, and mocks
//! This module contains shared functionality used across different test categories

pub mod fixtures;
pub mod mocks;

use notorious::commands::music::audio_sources::TrackMetadata;
use notorious::commands::music::utils::voice_state::{Requester, Song};
use poise::serenity_prelude::UserId;

/// A song requested by user `requester`, with a stable fake URL.
pub fn song(title: &str, requester: u64) -> Song {
    Song::new(
        TrackMetadata {
            title: title.to_string(),
            url: Some(format!("https://www.youtube.com/watch?v={}", title)),
            uploader: Some("Uploader".to_string()),
            ..Default::default()
        },
        Requester {
            id: UserId::new(requester),
            name: format!("user{}", requester),
        },
    )
}

/// Titles of a sequence of songs, for compact assertions.
pub fn titles<'a>(songs: impl IntoIterator<Item = &'a Song>) -> Vec<String> {
    songs
        .into_iter()
        .map(|song| song.metadata.title.clone())
        .collect()
}
