use poise::serenity_prelude::GuildId;
use tokio::sync::Mutex;

use crate::common::mocks::MockStarter;
use crate::common::{song, titles};
use crate::test_utils;
use crate::{assert_eq, assert_matches};
use notorious::commands::music::utils::bass::BassBoost;
use notorious::commands::music::utils::event_handlers::{QueueOutcome, drive_queue};
use notorious::commands::music::utils::music_manager::{MusicError, MusicManager};
use notorious::commands::music::utils::voice_state::TrackEnd;
use notorious::utils::database::GuildSettings;

fn guild() -> GuildId {
    GuildId::new(42)
}

fn settings() -> GuildSettings {
    GuildSettings {
        volume: 100,
        bass: BassBoost::Off,
    }
}

fn manager_with(songs: &[&str]) -> Mutex<MusicManager> {
    let mut manager = MusicManager::default();
    let state = manager.state_or_insert(guild(), settings());
    for title in songs {
        state.enqueue(song(title, 1));
    }
    Mutex::new(manager)
}

/// Starts every song except the ones titled "broken".
fn starter() -> MockStarter {
    let mut starter = MockStarter::new();
    starter.expect_start().returning(|_, song, _| {
        if song.metadata.title == "broken" {
            Err(MusicError::AudioSourceError("Video unavailable".to_string()))
        } else {
            Ok(Some(song))
        }
    });
    starter
}

#[tokio::test]
async fn test_failed_song_is_reported_and_skipped() {
    test_utils::init();
    let manager = manager_with(&["broken", "good"]);
    manager.lock().await.state_mut(guild()).unwrap().toggle_loop();

    let mut starter = starter();
    starter
        .expect_report_failure()
        .withf(|_, song, error| {
            song.metadata.title == "broken" && error.to_string().contains("Video unavailable")
        })
        .times(1)
        .return_const(());

    let outcome = drive_queue(&manager, guild(), &starter, true).await;
    assert_matches!(outcome, QueueOutcome::Started(song) if song.metadata.title == "good");

    let mut manager = manager.lock().await;
    let state = manager.state_mut(guild()).unwrap();
    assert!(state.queue().is_empty());
    // Looping only brings back the song that actually played.
    assert_eq!(state.advance().unwrap().metadata.title, "good");
}

#[tokio::test]
async fn test_only_failing_songs_exhaust_the_queue() {
    test_utils::init();
    let manager = manager_with(&["broken"]);

    let mut starter = starter();
    starter.expect_report_failure().times(1).return_const(());

    assert_eq!(
        drive_queue(&manager, guild(), &starter, true).await,
        QueueOutcome::Exhausted
    );

    let manager = manager.lock().await;
    let state = manager.state(guild()).unwrap();
    assert!(state.is_idle());
    assert!(state.queue().is_empty());
}

#[tokio::test]
async fn test_playing_guild_is_left_alone() {
    let manager = manager_with(&["first", "second"]);
    manager.lock().await.state_mut(guild()).unwrap().advance();

    let mut starter = MockStarter::new();
    starter.expect_start().never();

    assert_eq!(
        drive_queue(&manager, guild(), &starter, true).await,
        QueueOutcome::Busy
    );
    let manager = manager.lock().await;
    assert_eq!(titles(manager.state(guild()).unwrap().queue().iter()), ["second"]);
}

#[tokio::test]
async fn test_guild_that_moved_on_is_busy() {
    let manager = manager_with(&["first"]);

    let mut starter = MockStarter::new();
    starter.expect_start().returning(|_, _, _| Ok(None));
    starter.expect_report_failure().never();

    assert_eq!(
        drive_queue(&manager, guild(), &starter, false).await,
        QueueOutcome::Busy
    );
}

#[tokio::test]
async fn test_guild_without_state_is_exhausted() {
    let manager = Mutex::new(MusicManager::default());

    let mut starter = MockStarter::new();
    starter.expect_start().never();

    assert_eq!(
        drive_queue(&manager, guild(), &starter, false).await,
        QueueOutcome::Exhausted
    );
}

#[tokio::test]
async fn test_old_track_end_does_not_skip_after_rejoin() {
    let manager = manager_with(&["old"]);
    let starter = starter();

    assert_matches!(
        drive_queue(&manager, guild(), &starter, true).await,
        QueueOutcome::Started(_)
    );
    let stale = {
        let mut manager = manager.lock().await;
        let generation = manager.state(guild()).unwrap().generation();
        manager.drop_state(guild());
        manager
            .state_or_insert(guild(), settings())
            .enqueue(song("new", 1));
        generation
    };

    assert_matches!(
        drive_queue(&manager, guild(), &starter, true).await,
        QueueOutcome::Started(song) if song.metadata.title == "new"
    );

    let mut manager = manager.lock().await;
    let state = manager.state_mut(guild()).unwrap();
    assert_eq!(state.end_track(stale, false), TrackEnd::Stale);
    assert_eq!(state.current().unwrap().metadata.title, "new");
}
