use super::*;

/// Remove a song from the queue by its position
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Position in the queue, starting at 1"]
    #[min = 1]
    index: usize,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let removed = {
        let mut manager = MUSIC_MANAGER.lock().await;
        match manager.state_mut(guild_id) {
            Some(state) if !state.queue().is_empty() => {
                let queue = state.queue_mut();
                match index.checked_sub(1) {
                    Some(zero_based) => Some(queue.remove(zero_based)?),
                    None => {
                        return Err(MusicError::InvalidQueuePosition {
                            position: index,
                            len: queue.len(),
                        }
                        .into());
                    }
                }
            }
            _ => None,
        }
    };

    match removed {
        Some(song) => ctx.send(embedded_messages::track_removed(&song, index)).await?,
        None => ctx.send(embedded_messages::empty_queue()).await?,
    };
    Ok(())
}
