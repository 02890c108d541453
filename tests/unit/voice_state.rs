use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::common::{song, titles};
use crate::{assert_eq, assert_matches, rstest};
use notorious::commands::music::utils::bass::BassBoost;
use notorious::commands::music::utils::music_manager::MusicError;
use notorious::commands::music::utils::voice_state::{SkipOutcome, VoiceState};
use poise::serenity_prelude::UserId;

/// Plays the queue out, returning the order songs became current.
fn drain(state: &mut VoiceState, limit: usize) -> Vec<String> {
    (0..limit)
        .map_while(|_| state.advance().map(|song| song.metadata.title.clone()))
        .collect()
}

#[test]
fn test_queue_plays_in_request_order() {
    let mut state = VoiceState::new(100, BassBoost::Off);
    for title in ["one", "two", "three"] {
        state.enqueue(song(title, 1));
    }

    assert_eq!(drain(&mut state, 10), ["one", "two", "three"]);
    assert!(state.is_idle());
}

#[test]
fn test_turning_loop_off_finishes_the_queue() {
    let mut state = VoiceState::default();
    state.enqueue(song("a", 1));
    state.enqueue(song("b", 1));
    state.toggle_loop();

    assert_eq!(drain(&mut state, 3), ["a", "b", "a"]);
    assert!(!state.toggle_loop());
    assert_eq!(drain(&mut state, 10), ["b"]);
}

#[test]
fn test_stop_makes_pending_track_end_stale() {
    let mut state = VoiceState::default();
    state.enqueue(song("a", 1));
    state.enqueue(song("b", 1));
    state.advance();
    let playing = state.generation();

    state.stop();
    state.enqueue(song("c", 1));

    assert!(!state.is_current_generation(playing));
    assert_eq!(drain(&mut state, 10), ["c"]);
}

#[rstest]
#[case(1, 1)]
#[case(3, 3)]
#[case(5, 5)]
fn test_votes_needed(#[case] threshold: usize, #[case] voters: u64) {
    let mut state = VoiceState::default();
    state.enqueue(song("a", 1));
    state.advance();

    let outcomes: Vec<SkipOutcome> = (0..voters)
        .map(|voter| state.vote_skip(UserId::new(100 + voter), threshold))
        .collect();

    assert_matches!(outcomes.last(), Some(SkipOutcome::Passed { .. }));
    assert!(
        outcomes[..outcomes.len() - 1]
            .iter()
            .all(|outcome| matches!(outcome, SkipOutcome::Registered { .. }))
    );
}

#[test]
fn test_shuffle_then_remove() {
    let mut state = VoiceState::default();
    for title in ["a", "b", "c", "d"] {
        state.enqueue(song(title, 1));
    }

    state.queue_mut().shuffle(&mut StdRng::seed_from_u64(42));
    let order = titles(state.queue().iter());
    let removed = state.queue_mut().remove(0).unwrap();

    assert_eq!(removed.metadata.title, order[0]);
    assert_eq!(titles(state.queue().iter()), order[1..].to_vec());
}

#[test]
fn test_invalid_volume_keeps_old_level() {
    let mut state = VoiceState::new(80, BassBoost::Off);
    assert_matches!(state.set_volume(1000), Err(MusicError::InvalidVolume { .. }));
    assert_eq!(state.volume(), 80);
    assert!((state.volume_factor() - 0.8).abs() < f32::EPSILON);
}

#[test]
fn test_queue_pages_cover_every_song() {
    let mut state = VoiceState::default();
    for i in 0..23 {
        state.enqueue(song(&format!("s{}", i), 1));
    }

    let pages = state.queue().page(1, 10).pages;
    let positions: Vec<usize> = (1..=pages)
        .flat_map(|page| {
            state
                .queue()
                .page(page, 10)
                .entries
                .into_iter()
                .map(|(position, _)| position)
                .collect::<Vec<_>>()
        })
        .collect();

    assert_eq!(positions, (1..=23).collect::<Vec<_>>());
}
