use super::*;
use utils::bass::BassBoost;
use utils::event_handlers::{StartMode, start_song};

async fn autocomplete_preset<'a>(
    _ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    BassBoost::advertised()
        .map(BassBoost::name)
        .filter(move |name| name.starts_with(&partial.to_lowercase()))
        .map(String::from)
}

/// Set the bass boost preset
#[poise::command(prefix_command, slash_command, guild_only, category = "Music")]
pub async fn bass(
    ctx: Context<'_>,
    #[description = "off, low, medium, high, ultra or maximum"]
    #[autocomplete = "autocomplete_preset"]
    preset: String,
) -> CommandResult {
    let guild_id = guild_id(ctx)?;
    let preset: BassBoost = preset.parse()?;

    let settings = guild_settings(ctx, guild_id).await;
    let (old, restart, settings) = {
        let mut manager = MUSIC_MANAGER.lock().await;
        let state = manager.state_or_insert(guild_id, settings);
        let old = state.set_bass(preset);
        let restart = state
            .current()
            .cloned()
            .zip(state.track().cloned())
            .map(|(song, track)| (song, track, state.generation(), state.track_offset()));
        (old, restart, manager.settings(guild_id))
    };
    if let Some(settings) = settings {
        MusicManager::store_settings(&ctx.data().config, guild_id, settings).await;
    }

    info!("Bass in guild {} changed from {} to {}", guild_id, old, preset);
    ctx.send(embedded_messages::bass_changed(old, preset)).await?;

    if let Some((song, track, generation, offset)) = restart {
        let position = offset + track.get_info().await?.position;
        start_song(
            &playback(ctx),
            guild_id,
            song,
            generation,
            StartMode::Restart { position },
        )
        .await?;
    }

    Ok(())
}
