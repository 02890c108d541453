use super::*;

/// Shuffle the queue
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn shuffle(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let shuffled = {
        let mut manager = MUSIC_MANAGER.lock().await;
        match manager.state_mut(guild_id) {
            Some(state) if !state.queue().is_empty() => {
                state.queue_mut().shuffle(&mut rand::rng());
                true
            }
            _ => false,
        }
    };

    if shuffled {
        ctx.say("✅").await?;
    } else {
        ctx.send(embedded_messages::empty_queue()).await?;
    }
    Ok(())
}
