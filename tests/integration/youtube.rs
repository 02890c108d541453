use mockall::predicate::function;
use std::sync::Arc;
use std::time::Duration;

use crate::common::fixtures::{EMPTY_PLAYLIST_JSON, PLAYLIST_JSON, SEARCH_JSON, VIDEO_JSON};
use crate::common::mocks::MockYtDlp;
use crate::{assert_eq, assert_matches};
use notorious::commands::music::audio_sources::AudioApi;
use notorious::commands::music::audio_sources::youtube::YoutubeApi;
use notorious::commands::music::utils::music_manager::MusicError;

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

#[tokio::test]
async fn test_video_metadata_is_cached() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.iter().any(|a| a == "-j") && args.iter().any(|a| a == VIDEO_URL)
        }))
        .times(1)
        .returning(|_| Ok(VIDEO_JSON.to_string()));

    let api = YoutubeApi::new(Arc::new(runner));
    let first = api.from_url(VIDEO_URL).await.unwrap();
    let second = api.from_url(VIDEO_URL).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.title, "Never Gonna Give You Up");
    assert_eq!(first.duration, Some(Duration::from_secs(212)));
    assert_eq!(first.uploader.as_deref(), Some("Rick Astley"));
}

#[tokio::test]
async fn test_playlist_link_returns_every_entry() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.iter().any(|a| a == "--flat-playlist")
        }))
        .times(1)
        .returning(|_| Ok(PLAYLIST_JSON.to_string()));

    let api = YoutubeApi::new(Arc::new(runner));
    let tracks = api
        .get_metadata("https://www.youtube.com/playlist?list=PL123")
        .await
        .unwrap();

    let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
    assert_eq!(tracks[1].uploader.as_deref(), Some("Band B"));
}

#[tokio::test]
async fn test_empty_playlist_is_an_error() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .returning(|_| Ok(EMPTY_PLAYLIST_JSON.to_string()));

    let api = YoutubeApi::new(Arc::new(runner));
    assert_matches!(
        api.from_playlist("https://www.youtube.com/playlist?list=PL0").await,
        Err(MusicError::AudioSourceError(message)) if message.contains("Nothing")
    );
}

#[tokio::test]
async fn test_search_uses_first_result() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.last().map(String::as_str) == Some("ytsearch1:bohemian rhapsody")
        }))
        .times(1)
        .returning(|_| Ok(SEARCH_JSON.to_string()));

    let api = YoutubeApi::new(Arc::new(runner));
    let track = api.from_search("bohemian rhapsody").await.unwrap();

    assert_eq!(track.title, "Bohemian Rhapsody");
    assert_eq!(
        track.url.as_deref(),
        Some("https://www.youtube.com/watch?v=fJ9rUzIMcZQ")
    );
}

#[tokio::test]
async fn test_search_without_results() {
    let mut runner = MockYtDlp::new();
    runner.expect_run().returning(|_| Ok(String::new()));

    let api = YoutubeApi::new(Arc::new(runner));
    let err = api.from_search("asdfghjkl").await.unwrap_err();
    assert_eq!(err.to_string(), "Audio source error: No results found for 'asdfghjkl'");
}

#[tokio::test]
async fn test_stream_url_takes_first_line() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.iter().any(|a| a == "-g") && args.iter().any(|a| a == "bestaudio/best")
        }))
        .returning(|_| Ok("\nhttps://rr1.googlevideo.com/audio\n".to_string()));

    let api = YoutubeApi::new(Arc::new(runner));
    assert_eq!(
        api.stream_url(VIDEO_URL).await.unwrap(),
        "https://rr1.googlevideo.com/audio"
    );
}

#[tokio::test]
async fn test_runner_failure_is_propagated() {
    let mut runner = MockYtDlp::new();
    runner.expect_run().returning(|_| {
        Err(MusicError::AudioSourceError(
            "yt-dlp failed: ERROR: Video unavailable".to_string(),
        ))
    });

    let api = YoutubeApi::new(Arc::new(runner));
    assert_matches!(
        api.from_url(VIDEO_URL).await,
        Err(MusicError::AudioSourceError(message)) if message.contains("Video unavailable")
    );
}

#[tokio::test]
async fn test_cache_evicts_oldest_entry() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .times(4)
        .returning(|_| Ok(VIDEO_JSON.to_string()));

    let api = YoutubeApi::with_capacity(Arc::new(runner), 2);
    for id in ["a", "b", "c"] {
        api.from_url(&format!("https://www.youtube.com/watch?v={}", id))
            .await
            .unwrap();
    }
    assert_eq!(api.cached(), 2);

    // "c" is still cached, "a" was evicted and is fetched again.
    api.from_url("https://www.youtube.com/watch?v=c").await.unwrap();
    api.from_url("https://www.youtube.com/watch?v=a").await.unwrap();
    assert_eq!(api.cached(), 2);
}
