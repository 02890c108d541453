//! Mock implementations for external dependencies
//! This module contains mock objects used for testing

use async_trait::async_trait;
use mockall::mock;
use std::sync::Arc;

use notorious::commands::music::audio_sources::AudioSourceResult;
use notorious::commands::music::audio_sources::AudioSources;
use notorious::commands::music::audio_sources::spotify::SpotifyApi;
use notorious::commands::music::audio_sources::youtube::{YoutubeApi, YtDlpRunner};
use notorious::commands::music::utils::event_handlers::SongStarter;
use notorious::commands::music::utils::music_manager::{MusicError, MusicResult};
use notorious::commands::music::utils::voice_state::Song;
use poise::serenity_prelude::GuildId;

// Stand-in for the `yt-dlp` process.
mock! {
    pub YtDlp {}

    #[async_trait]
    impl YtDlpRunner for YtDlp {
        async fn run(&self, args: Vec<String>) -> AudioSourceResult<String>;
    }
}

// Stand-in for the voice call songs are started on.
mock! {
    pub Starter {}

    #[async_trait]
    impl SongStarter for Starter {
        async fn start(&self, guild_id: GuildId, song: Song, generation: u64) -> MusicResult<Option<Song>>;
        async fn report_failure(&self, guild_id: GuildId, song: Song, error: MusicError);
    }
}

/// Audio sources backed by a mocked `yt-dlp`.
pub fn sources_with(runner: MockYtDlp, spotify: Option<SpotifyApi>) -> AudioSources {
    AudioSources::new(
        YoutubeApi::new(Arc::new(runner)),
        spotify,
        "yt-dlp",
        "ffmpeg",
    )
}
