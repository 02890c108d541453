//! Per-guild playback state: the song queue, the current song, looping and
//! skip votes.
//!
//! Nothing here touches Discord or songbird. The player drives this state
//! machine and keeps the live track in sync with it.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use poise::serenity_prelude::{ChannelId, UserId};
use rand::Rng;
use rand::seq::SliceRandom;
use songbird::tracks::TrackHandle;

use super::bass::BassBoost;
use super::music_manager::{MusicError, MusicResult};
use crate::commands::music::audio_sources::TrackMetadata;
use crate::config::MAX_VOLUME;

/// Songs shown per queue page.
pub const QUEUE_PAGE_SIZE: usize = 10;

// Shared by every guild state, so a recreated state never reuses a number
// an old track end handler still holds.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// The member that asked for a song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub name: String,
}

/// A queued or playing song.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    pub metadata: TrackMetadata,
    pub requester: Requester,
}

impl Song {
    pub fn new(metadata: TrackMetadata, requester: Requester) -> Self {
        Self {
            metadata,
            requester,
        }
    }
}

/// One page of the queue, entries carry their absolute 1-based position.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuePage<'a> {
    pub page: usize,
    pub pages: usize,
    pub total: usize,
    pub entries: Vec<(usize, &'a Song)>,
}

/// FIFO of upcoming songs.
#[derive(Debug, Default, Clone)]
pub struct SongQueue {
    songs: VecDeque<Song>,
}

impl SongQueue {
    pub fn push(&mut self, song: Song) {
        self.songs.push_back(song);
    }

    pub fn pop(&mut self) -> Option<Song> {
        self.songs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn clear(&mut self) {
        self.songs.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.songs.make_contiguous().shuffle(rng);
    }

    /// Remove the song at a 0-based `index`.
    pub fn remove(&mut self, index: usize) -> MusicResult<Song> {
        let len = self.songs.len();
        self.songs
            .remove(index)
            .ok_or(MusicError::InvalidQueuePosition { position: index + 1, len })
    }

    /// A 1-based page of the queue. Out-of-range pages are clamped.
    pub fn page(&self, page: usize, per_page: usize) -> QueuePage<'_> {
        let per_page = per_page.max(1);
        let total = self.songs.len();
        let pages = total.div_ceil(per_page).max(1);
        let page = page.clamp(1, pages);
        let start = (page - 1) * per_page;

        let entries = self
            .songs
            .iter()
            .enumerate()
            .skip(start)
            .take(per_page)
            .map(|(i, song)| (i + 1, song))
            .collect();

        QueuePage {
            page,
            pages,
            total,
            entries,
        }
    }
}

/// Result of a skip vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    NothingPlaying,
    RequesterSkipped,
    AlreadyVoted { votes: usize },
    Passed { votes: usize },
    Registered { votes: usize, required: usize },
}

/// How the end of a track was settled.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEnd {
    /// The track was replaced or stopped, or its end was already handled.
    Stale,
    /// The current song played out.
    Finished,
    /// The current song could not be played and was dropped.
    Failed(Song),
}

/// Everything the bot knows about one guild's playback.
#[derive(Debug)]
pub struct VoiceState {
    queue: SongQueue,
    current: Option<Song>,
    track: Option<TrackHandle>,
    track_offset: Duration,
    looping: bool,
    skip_votes: HashSet<UserId>,
    volume: u16,
    bass: BassBoost,
    text_channel: Option<ChannelId>,
    generation: u64,
}

impl VoiceState {
    pub fn new(volume: u16, bass: BassBoost) -> Self {
        Self {
            queue: SongQueue::default(),
            current: None,
            track: None,
            track_offset: Duration::ZERO,
            looping: false,
            skip_votes: HashSet::new(),
            volume: volume.min(MAX_VOLUME),
            bass,
            text_channel: None,
            generation: 0,
        }
    }

    /// Add a song to the end of the queue, returning its 1-based position.
    pub fn enqueue(&mut self, song: Song) -> usize {
        self.queue.push(song);
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Finish the current song and make the next one current.
    ///
    /// With looping on, the finished song goes back to the tail of the queue
    /// first, so a lone looping song plays again.
    pub fn advance(&mut self) -> Option<&Song> {
        if let Some(finished) = self.current.take() {
            if self.looping {
                self.queue.push(finished);
            }
        }

        self.track = None;
        self.skip_votes.clear();
        self.current = self.queue.pop();
        if self.current.is_some() {
            self.generation = next_generation();
        }
        self.current.as_ref()
    }

    /// Settle the end of the track started for `generation`.
    ///
    /// A failed song is dropped so looping cannot bring it back. The
    /// generation is consumed, a second end event for the same track is stale.
    pub fn end_track(&mut self, generation: u64, failed: bool) -> TrackEnd {
        if !self.is_current_generation(generation) || self.current.is_none() {
            return TrackEnd::Stale;
        }
        self.generation = next_generation();

        if !failed {
            return TrackEnd::Finished;
        }
        match self.discard_current() {
            Some(song) => TrackEnd::Failed(song),
            None => TrackEnd::Stale,
        }
    }

    /// Forget the current song without putting it back into a looping queue.
    pub fn discard_current(&mut self) -> Option<Song> {
        self.track = None;
        self.current.take()
    }

    /// Flip looping, returning the new value.
    pub fn toggle_loop(&mut self) -> bool {
        self.looping = !self.looping;
        self.looping
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn vote_skip(&mut self, voter: UserId, threshold: usize) -> SkipOutcome {
        let Some(current) = &self.current else {
            return SkipOutcome::NothingPlaying;
        };

        if current.requester.id == voter {
            return SkipOutcome::RequesterSkipped;
        }

        if !self.skip_votes.insert(voter) {
            return SkipOutcome::AlreadyVoted {
                votes: self.skip_votes.len(),
            };
        }

        let votes = self.skip_votes.len();
        if votes >= threshold {
            self.skip_votes.clear();
            SkipOutcome::Passed { votes }
        } else {
            SkipOutcome::Registered {
                votes,
                required: threshold,
            }
        }
    }

    /// Set the volume percentage, returning the previous one.
    pub fn set_volume(&mut self, level: u16) -> MusicResult<u16> {
        if level > MAX_VOLUME {
            return Err(MusicError::InvalidVolume {
                level: level.into(),
                max: MAX_VOLUME,
            });
        }
        Ok(std::mem::replace(&mut self.volume, level))
    }

    pub fn volume(&self) -> u16 {
        self.volume
    }

    /// Volume as the multiplier songbird expects.
    pub fn volume_factor(&self) -> f32 {
        f32::from(self.volume) / 100.0
    }

    /// Set the bass preset, returning the previous one.
    pub fn set_bass(&mut self, preset: BassBoost) -> BassBoost {
        std::mem::replace(&mut self.bass, preset)
    }

    pub fn bass(&self) -> BassBoost {
        self.bass
    }

    /// Drop the queue and the current song. Pending end-of-track events for
    /// the old song become stale.
    pub fn stop(&mut self) -> Option<TrackHandle> {
        self.queue.clear();
        self.current = None;
        self.skip_votes.clear();
        self.generation = next_generation();
        self.track.take()
    }

    /// Mark a restart of the current song (e.g. a new bass preset) so the end
    /// event of the replaced track does not advance the queue.
    pub fn restart_generation(&mut self) -> u64 {
        self.generation = next_generation();
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current_generation(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn current(&self) -> Option<&Song> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Song> {
        self.current.as_mut()
    }

    pub fn queue(&self) -> &SongQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut SongQueue {
        &mut self.queue
    }

    pub fn track(&self) -> Option<&TrackHandle> {
        self.track.as_ref()
    }

    /// Where in the song the live track started.
    pub fn track_offset(&self) -> Duration {
        self.track_offset
    }

    /// Install the live track of the current song, returning the one it replaces.
    pub fn set_track(&mut self, track: TrackHandle, offset: Duration) -> Option<TrackHandle> {
        self.track_offset = offset;
        self.track.replace(track)
    }

    pub fn text_channel(&self) -> Option<ChannelId> {
        self.text_channel
    }

    pub fn set_text_channel(&mut self, channel: ChannelId) {
        self.text_channel = Some(channel);
    }
}

impl Default for VoiceState {
    fn default() -> Self {
        Self::new(100, BassBoost::Off)
    }
}
