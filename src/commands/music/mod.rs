pub mod bass;
pub mod join;
pub mod leave;
pub mod looping;
pub mod now;
pub mod pause;
pub mod play;
pub mod queue;
pub mod remove;
pub mod resume;
pub mod shuffle;
pub mod skip;
pub mod stop;
pub mod summon;
pub mod volume;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use poise::{CreateReply, serenity_prelude as serenity};
use std::time::Duration;
use tracing::{debug, info};
use utils::embedded_messages;
use utils::event_handlers::PlaybackContext;
use crate::utils::database::GuildSettings;
use utils::music_manager::{MUSIC_MANAGER, MusicError, MusicManager, MusicResult};
use utils::voice_state::Requester;

/// Every music command, in help order.
pub fn commands() -> Vec<poise::Command<crate::Data, crate::Error>> {
    vec![
        join::join(),
        summon::summon(),
        play::play(),
        pause::pause(),
        resume::resume(),
        volume::volume(),
        skip::skip(),
        bass::bass(),
        stop::stop(),
        leave::leave(),
        now::now(),
        looping::looping(),
        queue::queue(),
        shuffle::shuffle(),
        remove::remove(),
    ]
}

fn guild_id(ctx: Context<'_>) -> MusicResult<serenity::GuildId> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

fn playback(ctx: Context<'_>) -> PlaybackContext {
    PlaybackContext::new(ctx.serenity_context(), ctx.data())
}

fn requester(ctx: Context<'_>) -> Requester {
    Requester {
        id: ctx.author().id,
        name: ctx.author().name.clone(),
    }
}

/// Settings a guild plays with, read from the database for guilds without a state.
async fn guild_settings(ctx: Context<'_>, guild_id: serenity::GuildId) -> GuildSettings {
    let live = MUSIC_MANAGER.lock().await.settings(guild_id);
    match live {
        Some(settings) => settings,
        None => MusicManager::load_settings(&ctx.data().config, guild_id).await,
    }
}

/// Position of the live track, accounting for restarts part-way in.
async fn current_position(guild_id: serenity::GuildId) -> Option<Duration> {
    let (track, offset) = {
        let manager = MUSIC_MANAGER.lock().await;
        let state = manager.state(guild_id)?;
        (state.track()?.clone(), state.track_offset())
    };
    let info = track.get_info().await.ok()?;
    Some(offset + info.position)
}
