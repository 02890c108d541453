use super::*;
use songbird::tracks::PlayMode;

/// Resume a paused song
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn resume(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let track = {
        let manager = MUSIC_MANAGER.lock().await;
        manager
            .state(guild_id)
            .and_then(|state| state.track().cloned())
            .ok_or(MusicError::NothingPlaying)?
    };

    if track.get_info().await?.playing != PlayMode::Pause {
        return Err(MusicError::NothingPlaying.into());
    }

    track.play()?;
    ctx.say("⏯").await?;
    Ok(())
}
