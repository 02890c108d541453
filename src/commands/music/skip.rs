use super::*;
use utils::voice_state::SkipOutcome;

/// Vote to skip the current song. The requester skips immediately.
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let threshold = ctx.data().config.skip_vote_threshold;

    let (outcome, track) = {
        let mut manager = MUSIC_MANAGER.lock().await;
        let state = manager.state_mut(guild_id).ok_or(MusicError::NothingPlaying)?;
        let outcome = state.vote_skip(ctx.author().id, threshold);
        (outcome, state.track().cloned())
    };

    info!("Skip vote by {} in guild {}: {:?}", ctx.author().name, guild_id, outcome);

    match outcome {
        SkipOutcome::NothingPlaying => return Err(MusicError::NothingPlaying.into()),
        SkipOutcome::RequesterSkipped | SkipOutcome::Passed { .. } => {
            // Stopping the track lets its end event advance the queue.
            if let Some(track) = track {
                track.stop()?;
            }
            ctx.send(embedded_messages::skipped()).await?;
        }
        SkipOutcome::AlreadyVoted { .. } => {
            ctx.send(embedded_messages::already_voted()).await?;
        }
        SkipOutcome::Registered { votes, required } => {
            ctx.send(embedded_messages::skip_vote_added(votes, required))
                .await?;
        }
    }

    Ok(())
}
