//! Turns a track URL into a songbird `Input`.
//!
//! Plain playback goes through songbird's own `yt-dlp` input. When a bass
//! preset is active, or playback has to start part-way into the track, the
//! direct stream URL is piped through `ffmpeg` instead.

use std::process::{Command, Stdio};
use std::time::Duration;

use songbird::input::{ChildContainer, Input, YoutubeDl};
use tracing::{debug, info};

use super::{AudioSourceResult, AudioSources};
use crate::HTTP_CLIENT;
use crate::commands::music::utils::bass::BassBoost;
use crate::commands::music::utils::music_manager::MusicError;

/// Arguments for an `ffmpeg` process decoding `stream_url` to WAV on stdout.
pub fn ffmpeg_args(stream_url: &str, filter: Option<String>, start: Duration) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-reconnect".into(),
        "1".into(),
        "-reconnect_streamed".into(),
        "1".into(),
        "-reconnect_delay_max".into(),
        "5".into(),
    ];

    if !start.is_zero() {
        args.push("-ss".into());
        args.push(format!("{:.3}", start.as_secs_f64()));
    }

    args.push("-i".into());
    args.push(stream_url.into());
    args.push("-vn".into());

    if let Some(filter) = filter {
        args.push("-af".into());
        args.push(filter);
    }

    args.extend(
        ["-c:a", "pcm_s16le", "-ar", "48000", "-ac", "2", "-f", "wav", "-"]
            .into_iter()
            .map(String::from),
    );
    args
}

/// Create the input for `url` with the given bass preset, starting at `start`.
pub async fn create_input(
    sources: &AudioSources,
    url: &str,
    bass: BassBoost,
    start: Duration,
) -> AudioSourceResult<Input> {
    if bass.is_off() && start.is_zero() {
        debug!("Creating yt-dlp input for {}", url);
        let input = YoutubeDl::new_ytdl_like(
            sources.ytdlp_program(),
            HTTP_CLIENT.clone(),
            url.to_string(),
        );
        return Ok(input.into());
    }

    let stream_url = sources.youtube.stream_url(url).await?;
    let args = ffmpeg_args(&stream_url, bass.ffmpeg_filter(), start);

    info!(
        "Starting ffmpeg for {} (bass: {}, offset: {:?})",
        url, bass, start
    );

    let child = Command::new(sources.ffmpeg_program())
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            MusicError::AudioSourceError(format!(
                "Failed to start {}: {}",
                sources.ffmpeg_program(),
                e
            ))
        })?;

    Ok(ChildContainer::from(child).into())
}
