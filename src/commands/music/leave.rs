use super::*;

/// Leave the voice channel
#[poise::command(prefix_command, slash_command, guild_only, category = "Music", aliases("disconnect"))]
pub async fn leave(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    MusicManager::leave_channel(ctx.serenity_context(), guild_id).await?;

    let state = MUSIC_MANAGER.lock().await.drop_state(guild_id);
    if let Some(track) = state.as_ref().and_then(|state| state.track()) {
        let _ = track.stop();
    }

    ctx.send(embedded_messages::goodbye()).await?;
    Ok(())
}
