use super::*;

/// Change the player volume
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn volume(
    ctx: Context<'_>,
    #[description = "Volume in percent, 0 to 300"]
    #[min = 0]
    #[max = 300]
    level: u16,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let settings = guild_settings(ctx, guild_id).await;
    let (old, settings) = {
        let mut manager = MUSIC_MANAGER.lock().await;
        let state = manager.state_or_insert(guild_id, settings);
        let old = state.set_volume(level)?;

        if let Some(track) = state.track() {
            track.set_volume(state.volume_factor())?;
        }
        (old, manager.settings(guild_id))
    };
    if let Some(settings) = settings {
        MusicManager::store_settings(&ctx.data().config, guild_id, settings).await;
    }

    debug!("Volume in guild {} changed from {}% to {}%", guild_id, old, level);
    ctx.send(embedded_messages::volume_changed(old, level)).await?;
    Ok(())
}
