use super::*;

/// Show the song that is playing
#[poise::command(prefix_command, slash_command, guild_only, category = "Music", aliases("current", "playing"))]
pub async fn now(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let song = {
        let manager = MUSIC_MANAGER.lock().await;
        manager
            .state(guild_id)
            .and_then(|state| state.current().cloned())
            .ok_or(MusicError::NothingPlaying)?
    };
    let position = current_position(guild_id).await;

    ctx.send(CreateReply::default().embed(embedded_messages::now_playing(&song, position)))
        .await?;
    Ok(())
}
