use super::*;
use poise::serenity_prelude::{ChannelType, GuildChannel};

/// Summon the bot to a voice channel, moving it if it is elsewhere
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn summon(
    ctx: Context<'_>,
    #[description = "Voice channel to join, defaults to yours"]
    #[channel_types("Voice", "Stage")]
    channel: Option<GuildChannel>,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;

    let channel_id = match channel {
        Some(channel) if matches!(channel.kind, ChannelType::Voice | ChannelType::Stage) => {
            channel.id
        }
        Some(_) => return Err(MusicError::NotAVoiceChannel.into()),
        None => MusicManager::get_user_voice_channel(
            ctx.serenity_context(),
            guild_id,
            ctx.author().id,
        )?,
    };

    // Joining while connected moves the existing call.
    MusicManager::join_channel(ctx.serenity_context(), guild_id, channel_id).await?;

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
