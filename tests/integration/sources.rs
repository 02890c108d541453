use mockall::predicate::function;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::fixtures::{SEARCH_JSON, VIDEO_JSON};
use crate::common::mocks::{MockYtDlp, sources_with};
use crate::{assert_eq, assert_matches};
use notorious::commands::music::audio_sources::spotify::SpotifyApi;
use notorious::commands::music::utils::music_manager::MusicError;
use notorious::config::SpotifyCredentials;

#[tokio::test]
async fn test_plain_text_is_searched() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.last().map(String::as_str) == Some("ytsearch1:queen")
        }))
        .times(1)
        .returning(|_| Ok(SEARCH_JSON.to_string()));

    let sources = sources_with(runner, None);
    let tracks = sources.resolve("  queen ").await.unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "Bohemian Rhapsody");
}

#[tokio::test]
async fn test_other_urls_go_to_ytdlp_as_is() {
    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.last().map(String::as_str) == Some("https://soundcloud.com/artist/track")
        }))
        .times(1)
        .returning(|_| Ok(VIDEO_JSON.to_string()));

    let sources = sources_with(runner, None);
    let tracks = sources
        .resolve("https://soundcloud.com/artist/track")
        .await
        .unwrap();
    assert_eq!(tracks.len(), 1);
}

#[tokio::test]
async fn test_empty_query_is_rejected() {
    let runner = MockYtDlp::new();
    let sources = sources_with(runner, None);
    assert_matches!(
        sources.resolve("   ").await,
        Err(MusicError::AudioSourceError(_))
    );
}

#[tokio::test]
async fn test_spotify_link_without_credentials() {
    let runner = MockYtDlp::new();
    let sources = sources_with(runner, None);
    assert_matches!(
        sources
            .resolve("https://open.spotify.com/track/4uLU6hMCjMI75M1A2tKUQC")
            .await,
        Err(MusicError::ConfigError(_))
    );
}

#[tokio::test]
async fn test_spotify_track_resolves_through_youtube_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tracks/xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Bohemian Rhapsody",
            "artists": [{"name": "Queen"}],
            "duration_ms": 354000
        })))
        .mount(&server)
        .await;

    let mut runner = MockYtDlp::new();
    runner
        .expect_run()
        .with(function(|args: &Vec<String>| {
            args.last().map(String::as_str) == Some("ytsearch1:Bohemian Rhapsody Queen")
        }))
        .times(1)
        .returning(|_| {
            // A search hit without a duration keeps the Spotify one.
            let mut doc: serde_json::Value = serde_json::from_str(SEARCH_JSON).unwrap();
            doc.as_object_mut().unwrap().remove("duration");
            Ok(doc.to_string())
        });

    let spotify = SpotifyApi::with_base_urls(
        reqwest::Client::new(),
        SpotifyCredentials {
            client_id: "id".into(),
            client_secret: "secret".into(),
        },
        &server.uri(),
        &server.uri(),
    );
    let sources = sources_with(runner, Some(spotify));

    let tracks = sources
        .resolve("https://open.spotify.com/track/xyz")
        .await
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert!(tracks[0].is_partial());

    let resolved = sources.resolve_partial(tracks[0].clone()).await.unwrap();
    assert!(!resolved.is_partial());
    assert_eq!(resolved.title, "Bohemian Rhapsody");
    assert_eq!(resolved.duration, Some(Duration::from_secs(354)));
}

#[tokio::test]
async fn test_complete_tracks_are_not_resolved_again() {
    let mut runner = MockYtDlp::new();
    runner.expect_run().times(0);

    let sources = sources_with(runner, None);
    let track = notorious::commands::music::audio_sources::TrackMetadata {
        title: "Done".into(),
        url: Some("https://www.youtube.com/watch?v=done".into()),
        ..Default::default()
    };

    assert_eq!(sources.resolve_partial(track.clone()).await.unwrap(), track);
}
