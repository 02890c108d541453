use super::*;

/// Join your voice channel
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn join(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let channel_id =
        MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id)?;

    MusicManager::ensure_same_channel(ctx.serenity_context(), guild_id, ctx.author().id).await?;

    let settings = guild_settings(ctx, guild_id).await;
    {
        let mut manager = MUSIC_MANAGER.lock().await;
        manager
            .state_or_insert(guild_id, settings)
            .set_text_channel(ctx.channel_id());
        // Leave again if nothing gets played.
        manager.arm_idle_timer_if_idle(
            ctx.serenity_context(),
            guild_id,
            ctx.data().config.idle_timeout,
        );
    }

    ctx.send(embedded_messages::joined(channel_id)).await?;
    Ok(())
}
