use super::*;

/// Stop playing, clear the queue and disconnect
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let track = {
        let mut manager = MUSIC_MANAGER.lock().await;
        let track = manager.state_mut(guild_id).and_then(|state| state.stop());
        manager.drop_state(guild_id);
        track
    };

    if let Some(track) = track {
        let _ = track.stop();
    }
    MusicManager::leave_channel(ctx.serenity_context(), guild_id).await?;

    ctx.send(embedded_messages::stopped()).await?;
    Ok(())
}
