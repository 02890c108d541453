use super::*;
use utils::event_handlers::{QueueOutcome, start_if_idle};
use utils::voice_state::Song;

/// Play a song, playlist or search result, or add it to the queue
///
/// Looping is left as it was, turn it off with `loop`.
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn play(
    ctx: Context<'_>,
    #[description = "YouTube or Spotify link, any URL yt-dlp knows, or a search term"]
    #[rest]
    query: String,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    ctx.defer().await?;

    MusicManager::ensure_same_channel(ctx.serenity_context(), guild_id, ctx.author().id).await?;

    let tracks = ctx.data().sources.resolve(&query).await?;
    let requester = requester(ctx);
    let songs: Vec<Song> = tracks
        .into_iter()
        .map(|metadata| Song::new(metadata, requester.clone()))
        .collect();
    let count = songs.len();
    let first = songs
        .first()
        .cloned()
        .ok_or_else(|| MusicError::AudioSourceError(format!("Nothing found for '{}'", query)))?;

    let settings = guild_settings(ctx, guild_id).await;
    {
        let mut manager = MUSIC_MANAGER.lock().await;
        let state = manager.state_or_insert(guild_id, settings);
        state.set_text_channel(ctx.channel_id());
        for song in songs {
            state.enqueue(song);
        }
    }
    info!(
        "{} queued {} song(s) in guild {}",
        requester.name, count, guild_id
    );

    if count > 1 {
        ctx.send(embedded_messages::added_many_to_queue(count)).await?;
    }

    match start_if_idle(&playback(ctx), guild_id).await {
        QueueOutcome::Started(song) => {
            ctx.send(CreateReply::default().embed(embedded_messages::now_playing(&song, None)))
                .await?;
        }
        QueueOutcome::Busy if count == 1 => {
            ctx.send(embedded_messages::added_to_queue(&first)).await?;
        }
        QueueOutcome::Busy => {}
        // Each failure was already reported in the channel.
        QueueOutcome::Exhausted => {
            ctx.send(embedded_messages::nothing_playable()).await?;
        }
    }

    Ok(())
}
