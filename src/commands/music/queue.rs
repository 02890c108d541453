use super::*;
use utils::voice_state::QUEUE_PAGE_SIZE;

/// Show the queue
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn queue(
    ctx: Context<'_>,
    #[description = "Page to show"]
    #[min = 1]
    page: Option<usize>,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let embed = {
        let manager = MUSIC_MANAGER.lock().await;
        manager
            .state(guild_id)
            .map(|state| state.queue())
            .filter(|queue| !queue.is_empty())
            .map(|queue| {
                embedded_messages::music_queue(&queue.page(page.unwrap_or(1), QUEUE_PAGE_SIZE))
            })
    };

    match embed {
        Some(embed) => ctx.send(CreateReply::default().embed(embed)).await?,
        None => ctx.send(embedded_messages::empty_queue()).await?,
    };
    Ok(())
}
