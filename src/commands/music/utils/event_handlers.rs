use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use ::serenity::all::CreateMessage;
use ::serenity::async_trait;
use songbird::tracks::PlayMode;
use songbird::{Event, EventContext, TrackEvent};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::embedded_messages;
use super::music_manager::{MUSIC_MANAGER, MusicError, MusicManager, MusicResult};
use super::voice_state::{Song, TrackEnd};
use crate::Data;
use crate::commands::music::audio_sources::AudioSources;
use crate::commands::music::audio_sources::input::create_input;
use crate::config::BotConfig;

/// What the player needs outside of a command invocation.
#[derive(Clone)]
pub struct PlaybackContext {
    pub ctx: serenity::Context,
    pub config: Arc<BotConfig>,
    pub sources: Arc<AudioSources>,
}

impl PlaybackContext {
    pub fn new(ctx: &serenity::Context, data: &Data) -> Self {
        Self {
            ctx: ctx.clone(),
            config: data.config.clone(),
            sources: data.sources.clone(),
        }
    }
}

/// Event handler for when a song ends
pub struct TrackEndNotifier {
    pub playback: PlaybackContext,
    pub guild_id: serenity::GuildId,
    /// Generation of the song this track was started for.
    pub generation: u64,
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            // Tracks that fail to load fire End as well.
            let failure = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(MusicError::AudioSourceError(e.to_string())),
                _ => None,
            });
            self.handle_track_end(failure).await;
        }
        None
    }
}

impl TrackEndNotifier {
    async fn handle_track_end(&self, failure: Option<MusicError>) {
        let end = {
            let mut manager = MUSIC_MANAGER.lock().await;
            match manager.state_mut(self.guild_id) {
                Some(state) => state.end_track(self.generation, failure.is_some()),
                None => TrackEnd::Stale,
            }
        };

        match (end, failure) {
            (TrackEnd::Stale, _) => {
                debug!(
                    "Ignoring stale track end in guild {} (generation {})",
                    self.guild_id, self.generation
                );
                return;
            }
            (TrackEnd::Failed(song), Some(error)) => {
                warn!("Track '{}' failed in guild {}: {}", song.metadata.title, self.guild_id, error);
                announce_failure(&self.playback, self.guild_id, &song, &error).await;
            }
            _ => info!("Track ended for guild {}", self.guild_id),
        }

        if let QueueOutcome::Started(song) = play_next_track(&self.playback, self.guild_id).await {
            announce_song(&self.playback, self.guild_id, &song).await;
        }
    }
}

/// How a song is put on the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// The song just became current.
    Fresh,
    /// The current song is replaced by a new track starting at `position`,
    /// e.g. after the bass preset changed.
    Restart { position: Duration },
}

/// Where driving the queue left a guild.
#[derive(Debug, Clone, PartialEq)]
pub enum QueueOutcome {
    /// This song is playing now.
    Started(Song),
    /// Something else is playing, or the guild moved on while the song was prepared.
    Busy,
    /// Nothing playable is left.
    Exhausted,
}

/// Puts the songs picked from a guild's queue on its call.
#[async_trait]
pub trait SongStarter: Send + Sync {
    /// Start `song`, made current with `generation`. `None` when the guild
    /// moved on in the meantime.
    async fn start(
        &self,
        guild_id: serenity::GuildId,
        song: Song,
        generation: u64,
    ) -> MusicResult<Option<Song>>;

    /// Tell the guild a song is skipped because it cannot be played.
    async fn report_failure(&self, guild_id: serenity::GuildId, song: Song, error: MusicError);
}

#[async_trait]
impl SongStarter for PlaybackContext {
    async fn start(
        &self,
        guild_id: serenity::GuildId,
        song: Song,
        generation: u64,
    ) -> MusicResult<Option<Song>> {
        start_song(self, guild_id, song, generation, StartMode::Fresh).await
    }

    async fn report_failure(&self, guild_id: serenity::GuildId, song: Song, error: MusicError) {
        announce_failure(self, guild_id, &song, &error).await;
    }
}

/// Advance the guild's queue and play the next song.
///
/// Songs whose audio cannot be created are reported and skipped. Once the
/// queue is exhausted the idle timer is armed.
pub async fn play_next_track(
    playback: &PlaybackContext,
    guild_id: serenity::GuildId,
) -> QueueOutcome {
    let outcome = drive_queue(&MUSIC_MANAGER, guild_id, playback, false).await;
    arm_when_exhausted(playback, guild_id, &outcome).await;
    outcome
}

/// Start the queue if nothing is playing.
pub async fn start_if_idle(playback: &PlaybackContext, guild_id: serenity::GuildId) -> QueueOutcome {
    let outcome = drive_queue(&MUSIC_MANAGER, guild_id, playback, true).await;
    arm_when_exhausted(playback, guild_id, &outcome).await;
    outcome
}

async fn arm_when_exhausted(
    playback: &PlaybackContext,
    guild_id: serenity::GuildId,
    outcome: &QueueOutcome,
) {
    if *outcome == QueueOutcome::Exhausted {
        info!("No more tracks in queue for guild {}", guild_id);
        MUSIC_MANAGER.lock().await.arm_idle_timer_if_idle(
            &playback.ctx,
            guild_id,
            playback.config.idle_timeout,
        );
    }
}

/// Make the next queued song current and hand it to `starter`, until one
/// starts or the queue runs dry.
///
/// With `only_if_idle`, a guild that is already playing is left alone. A
/// song that fails to start is reported and dropped, so looping cannot bring
/// it back.
pub async fn drive_queue<S: SongStarter + ?Sized>(
    manager: &Mutex<MusicManager>,
    guild_id: serenity::GuildId,
    starter: &S,
    mut only_if_idle: bool,
) -> QueueOutcome {
    loop {
        let (song, generation) = {
            let mut manager = manager.lock().await;
            let Some(state) = manager.state_mut(guild_id) else {
                return QueueOutcome::Exhausted;
            };
            if only_if_idle && !state.is_idle() {
                return QueueOutcome::Busy;
            }
            match state.advance().cloned() {
                Some(song) => (song, state.generation()),
                None => return QueueOutcome::Exhausted,
            }
        };

        match starter.start(guild_id, song.clone(), generation).await {
            Ok(Some(song)) => return QueueOutcome::Started(song),
            Ok(None) => return QueueOutcome::Busy,
            Err(e) => {
                warn!("Skipping '{}' in guild {}: {}", song.metadata.title, guild_id, e);
                {
                    let mut manager = manager.lock().await;
                    if let Some(state) = manager.state_mut(guild_id) {
                        if state.is_current_generation(generation) {
                            state.discard_current();
                        }
                    }
                }
                starter.report_failure(guild_id, song, e).await;
                // The failed song left the guild idle again.
                only_if_idle = false;
            }
        }
    }
}

/// Put `song` on the guild's call and return it with its metadata resolved.
///
/// `generation` is the generation the song was made current with. If the
/// guild moved on while the audio was being prepared, nothing is played and
/// `None` is returned.
pub async fn start_song(
    playback: &PlaybackContext,
    guild_id: serenity::GuildId,
    mut song: Song,
    generation: u64,
    mode: StartMode,
) -> MusicResult<Option<Song>> {
    if song.metadata.is_partial() {
        debug!("Resolving partial track '{}'", song.metadata.title);
        song.metadata = playback
            .sources
            .resolve_partial(song.metadata.clone())
            .await?;
    }

    let url = song.metadata.url.clone().ok_or_else(|| {
        MusicError::AudioSourceError(format!("'{}' has no playable URL", song.metadata.title))
    })?;

    let bass = {
        let manager = MUSIC_MANAGER.lock().await;
        match manager.state(guild_id) {
            Some(state) if state.is_current_generation(generation) => state.bass(),
            _ => return Ok(None),
        }
    };

    let offset = match mode {
        StartMode::Fresh => Duration::ZERO,
        StartMode::Restart { position } => position,
    };
    let input = create_input(&playback.sources, &url, bass, offset).await?;
    let call = MusicManager::get_call(&playback.ctx, guild_id).await?;

    let mut manager = MUSIC_MANAGER.lock().await;
    let Some(state) = manager.state_mut(guild_id) else {
        return Ok(None);
    };
    if !state.is_current_generation(generation) {
        debug!("Guild {} moved on before '{}' started", guild_id, song.metadata.title);
        return Ok(None);
    }

    // The replaced track's end event must not advance the queue.
    let generation = match mode {
        StartMode::Fresh => generation,
        StartMode::Restart { .. } => state.restart_generation(),
    };

    let handle = call.lock().await.play_input(input);
    if let Err(e) = handle.set_volume(state.volume_factor()) {
        warn!("Failed to set volume in guild {}: {}", guild_id, e);
    }
    if let Err(e) = handle.add_event(
        Event::Track(TrackEvent::End),
        TrackEndNotifier {
            playback: playback.clone(),
            guild_id,
            generation,
        },
    ) {
        warn!("Failed to register track end handler in guild {}: {}", guild_id, e);
    }

    if let Some(old) = state.set_track(handle, offset) {
        let _ = old.stop();
    }
    if let Some(current) = state.current_mut() {
        current.metadata = song.metadata.clone();
    }
    manager.cancel_idle_timer(guild_id);
    drop(manager);

    info!(
        "Playing '{}' in guild {} from {:?} (generation {})",
        song.metadata.title, guild_id, offset, generation
    );
    Ok(Some(song))
}

/// Post the Now-Playing embed in the guild's announcement channel.
async fn announce_song(playback: &PlaybackContext, guild_id: serenity::GuildId, song: &Song) {
    let channel = {
        let manager = MUSIC_MANAGER.lock().await;
        manager.state(guild_id).and_then(|state| state.text_channel())
    };

    if let Some(channel) = channel {
        let message = CreateMessage::new().embed(embedded_messages::now_playing(song, None));
        if let Err(e) = channel.send_message(&playback.ctx.http, message).await {
            warn!("Failed to announce song in guild {}: {}", guild_id, e);
        }
    }
}

async fn announce_failure(
    playback: &PlaybackContext,
    guild_id: serenity::GuildId,
    song: &Song,
    error: &MusicError,
) {
    let channel = {
        let manager = MUSIC_MANAGER.lock().await;
        manager.state(guild_id).and_then(|state| state.text_channel())
    };

    if let Some(channel) = channel {
        let text = embedded_messages::track_failed(song, &error.to_string());
        if let Err(e) = channel.say(&playback.ctx.http, text).await {
            warn!("Failed to report playback error in guild {}: {}", guild_id, e);
        }
    }
}

/// Drop a guild's playback when the bot itself is disconnected from voice.
pub async fn handle_voice_state_update(
    ctx: &serenity::Context,
    new: &serenity::VoiceState,
) -> MusicResult<()> {
    let Some(guild_id) = new.guild_id else {
        return Ok(());
    };
    if new.user_id != ctx.cache.current_user().id || new.channel_id.is_some() {
        return Ok(());
    }

    let state = MUSIC_MANAGER.lock().await.drop_state(guild_id);
    if let Some(track) = state.as_ref().and_then(|state| state.track()) {
        let _ = track.stop();
    }

    info!("Disconnected from voice in guild {}, dropped its queue", guild_id);
    if let Err(e) = MusicManager::leave_channel(ctx, guild_id).await {
        debug!("No call to clean up in guild {}: {}", guild_id, e);
    }
    Ok(())
}
