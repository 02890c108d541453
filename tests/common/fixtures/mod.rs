//! Test fixtures for the notorious music bot
//! This module contains sample `yt-dlp` output and configurations used in tests

use std::collections::HashMap;

/// `yt-dlp -j` output for a single video.
pub const VIDEO_JSON: &str = r#"{"id": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up", "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "duration": 212, "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg", "uploader": "Rick Astley", "uploader_url": "https://www.youtube.com/@RickAstleyYT"}"#;

/// `yt-dlp -j ytsearch1:...` output.
pub const SEARCH_JSON: &str = r#"{"id": "fJ9rUzIMcZQ", "title": "Bohemian Rhapsody", "webpage_url": "https://www.youtube.com/watch?v=fJ9rUzIMcZQ", "duration": 355, "uploader": "Queen Official"}"#;

/// `yt-dlp -J --flat-playlist` output with an unavailable entry.
pub const PLAYLIST_JSON: &str = r#"{
    "_type": "playlist",
    "title": "Road Trip",
    "entries": [
        {"_type": "url", "id": "a1", "url": "https://www.youtube.com/watch?v=a1", "title": "First", "duration": 180, "channel": "Band A"},
        null,
        {"_type": "url", "id": "b2", "url": "https://www.youtube.com/watch?v=b2", "title": "Second", "duration": 240, "channel": "Band B"}
    ]
}"#;

/// `yt-dlp -J --flat-playlist` output of an empty playlist.
pub const EMPTY_PLAYLIST_JSON: &str = r#"{"_type": "playlist", "title": "Nothing", "entries": []}"#;

/// Sample user ID for testing
pub const SAMPLE_USER_ID: u64 = 123456789;

/// Minimal environment for a valid configuration.
pub fn base_env() -> HashMap<String, String> {
    HashMap::from([("DISCORD_TOKEN".to_string(), "token".to_string())])
}
