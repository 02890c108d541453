use super::*;

/// Toggle looping of the queue
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    category = "Music",
    rename = "loop"
)]
pub async fn looping(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let settings = guild_settings(ctx, guild_id).await;
    let enabled = MUSIC_MANAGER
        .lock()
        .await
        .state_or_insert(guild_id, settings)
        .toggle_loop();

    ctx.send(embedded_messages::loop_status(enabled)).await?;
    Ok(())
}
