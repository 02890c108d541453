use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::{Call, Songbird};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::voice_state::VoiceState;
use crate::config::BotConfig;
use crate::utils::database::{self, GuildSettings};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("You are not connected to a voice channel")]
    UserNotInVoiceChannel,

    #[error("Bot is already in another voice channel, sorry :(")]
    AlreadyInOtherChannel,

    #[error("That is not a voice channel")]
    NotAVoiceChannel,

    #[error("Audio source error: {0}")]
    AudioSourceError(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Nothing is playing right now")]
    NothingPlaying,

    #[error("There is no song at position {position}, the queue has {len} songs")]
    InvalidQueuePosition { position: usize, len: usize },

    #[error("Volume must be between 0 and {max}, got {level}")]
    InvalidVolume { level: u64, max: u16 },

    #[error("Preset provided must be one of: {0}")]
    InvalidBassPreset(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Holds the playback state of every guild the bot plays in, plus the timers
/// that disconnect the bot from idle guilds.
#[derive(Default)]
pub struct MusicManager {
    // Map of guild ID to voice state
    states: HashMap<GuildId, VoiceState>,
    // Map of guild ID to pending idle-disconnect task
    idle_tasks: HashMap<GuildId, JoinHandle<()>>,
}

pub static MUSIC_MANAGER: LazyLock<Arc<Mutex<MusicManager>>> =
    LazyLock::new(|| Arc::new(Mutex::new(MusicManager::default())));

impl MusicManager {
    /// Get the Songbird voice client from the context
    pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
        songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
    }

    /// Get the current voice channel call handle
    pub async fn get_call(
        ctx: &Context,
        guild_id: GuildId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;
        songbird.get(guild_id).ok_or(MusicError::NotConnected)
    }

    pub fn state(&self, guild_id: GuildId) -> Option<&VoiceState> {
        self.states.get(&guild_id)
    }

    pub fn state_mut(&mut self, guild_id: GuildId) -> Option<&mut VoiceState> {
        self.states.get_mut(&guild_id)
    }

    /// The guild's state, created with `settings` if it has none yet.
    pub fn state_or_insert(&mut self, guild_id: GuildId, settings: GuildSettings) -> &mut VoiceState {
        self.states.entry(guild_id).or_insert_with(|| {
            debug!(
                "Created voice state for guild {} (volume {}%, bass {})",
                guild_id, settings.volume, settings.bass
            );
            VoiceState::new(settings.volume, settings.bass)
        })
    }

    /// Forget a guild's state and cancel its idle timer.
    pub fn drop_state(&mut self, guild_id: GuildId) -> Option<VoiceState> {
        self.cancel_idle_timer(guild_id);
        self.states.remove(&guild_id)
    }

    /// The volume and bass preset a guild currently plays with.
    pub fn settings(&self, guild_id: GuildId) -> Option<GuildSettings> {
        self.states.get(&guild_id).map(|state| GuildSettings {
            volume: state.volume(),
            bass: state.bass(),
        })
    }

    /// Stored settings of a guild, or the configured defaults. Failures are logged.
    pub async fn load_settings(config: &BotConfig, guild_id: GuildId) -> GuildSettings {
        let path = config.database_path.clone();
        let stored = tokio::task::spawn_blocking(move || -> MusicResult<Option<GuildSettings>> {
            Ok(database::get_guild_settings(&path, guild_id)?)
        })
        .await;

        let defaults = GuildSettings {
            volume: config.default_volume,
            bass: Default::default(),
        };
        match stored {
            Ok(Ok(settings)) => settings.unwrap_or(defaults),
            Ok(Err(e)) => {
                warn!("Failed to load settings for guild {}: {}", guild_id, e);
                defaults
            }
            Err(e) => {
                warn!("Settings lookup for guild {} panicked: {}", guild_id, e);
                defaults
            }
        }
    }

    /// Persist the volume and bass preset of a guild. Failures are logged.
    pub async fn store_settings(config: &BotConfig, guild_id: GuildId, settings: GuildSettings) {
        let path = config.database_path.clone();
        let stored = tokio::task::spawn_blocking(move || -> MusicResult<()> {
            Ok(database::set_guild_settings(&path, guild_id, settings)?)
        })
        .await;

        match stored {
            Ok(Ok(())) => debug!("Saved settings for guild {}", guild_id),
            Ok(Err(e)) => warn!("Failed to save settings for guild {}: {}", guild_id, e),
            Err(e) => warn!("Settings write for guild {} panicked: {}", guild_id, e),
        }
    }

    /// Disconnect from `guild_id` after `timeout` unless playback starts again.
    pub fn arm_idle_timer(&mut self, ctx: &Context, guild_id: GuildId, timeout: Option<Duration>) {
        let Some(timeout) = timeout else {
            return;
        };
        self.cancel_idle_timer(guild_id);

        let ctx = ctx.clone();
        debug!("Arming idle timer for guild {} ({:?})", guild_id, timeout);

        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            {
                let mut manager = MUSIC_MANAGER.lock().await;
                let idle = manager.state(guild_id).is_none_or(VoiceState::is_idle);
                if !idle {
                    return;
                }
                // Dropping our own handle; the task is finishing anyway.
                manager.idle_tasks.remove(&guild_id);
                manager.states.remove(&guild_id);
            }

            info!("Leaving guild {} after being idle for {:?}", guild_id, timeout);
            if let Err(e) = Self::leave_channel(&ctx, guild_id).await {
                debug!("Idle disconnect for guild {}: {}", guild_id, e);
            }
        });

        self.idle_tasks.insert(guild_id, task);
    }

    /// Arm the idle timer if the guild has a state with nothing playing.
    pub fn arm_idle_timer_if_idle(
        &mut self,
        ctx: &Context,
        guild_id: GuildId,
        timeout: Option<Duration>,
    ) {
        if self.is_idle(guild_id) {
            self.arm_idle_timer(ctx, guild_id, timeout);
        }
    }

    /// Whether the guild is connected with nothing playing.
    pub fn is_idle(&self, guild_id: GuildId) -> bool {
        self.state(guild_id).is_some_and(VoiceState::is_idle)
    }

    pub fn cancel_idle_timer(&mut self, guild_id: GuildId) {
        if let Some(task) = self.idle_tasks.remove(&guild_id) {
            debug!("Cancelling idle timer for guild {}", guild_id);
            task.abort();
        }
    }

    /// Join a voice channel
    pub async fn join_channel(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;

        let handle = songbird
            .join(guild_id, channel_id)
            .await
            .map_err(|e| MusicError::JoinError(e.to_string()))?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(handle)
    }

    /// Leave a voice channel
    pub async fn leave_channel(ctx: &Context, guild_id: GuildId) -> MusicResult<()> {
        let songbird = Self::get_songbird(ctx).await?;

        if songbird.get(guild_id).is_none() {
            return Err(MusicError::NotConnected);
        }

        songbird
            .remove(guild_id)
            .await
            .map_err(|_| MusicError::JoinError("Failed to leave voice channel".to_string()))?;

        info!("Left voice channel in guild {}", guild_id);
        Ok(())
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        let voice_state = guild
            .voice_states
            .get(&user_id)
            .ok_or(MusicError::UserNotInVoiceChannel)?;

        voice_state
            .channel_id
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// The voice channel the bot currently sits in, if any.
    pub async fn get_bot_voice_channel(ctx: &Context, guild_id: GuildId) -> Option<ChannelId> {
        let call = Self::get_call(ctx, guild_id).await.ok()?;
        let channel = call.lock().await.current_channel()?;
        Some(ChannelId::new(channel.0.get()))
    }

    /// Make sure the bot is in the author's voice channel.
    ///
    /// Joins when disconnected, refuses when the bot already serves another
    /// channel of the guild.
    pub async fn ensure_same_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let channel_id = Self::get_user_voice_channel(ctx, guild_id, user_id)?;

        match Self::get_bot_voice_channel(ctx, guild_id).await {
            Some(current) if current != channel_id => Err(MusicError::AlreadyInOtherChannel),
            Some(_) => Self::get_call(ctx, guild_id).await,
            None => Self::join_channel(ctx, guild_id, channel_id).await,
        }
    }
}
