use super::*;
use songbird::tracks::PlayMode;

/// Pause the current song
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn pause(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let (track, duration, offset) = {
        let manager = MUSIC_MANAGER.lock().await;
        let state = manager.state(guild_id).ok_or(MusicError::NothingPlaying)?;
        let track = state.track().cloned().ok_or(MusicError::NothingPlaying)?;
        let duration = state.current().and_then(|song| song.metadata.duration);
        (track, duration, state.track_offset())
    };

    let info = track.get_info().await?;
    if info.playing != PlayMode::Play {
        return Err(MusicError::NothingPlaying.into());
    }

    track.pause()?;
    ctx.send(embedded_messages::paused(offset + info.position, duration))
        .await?;
    Ok(())
}
