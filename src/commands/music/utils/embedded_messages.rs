use poise::{CreateReply, serenity_prelude as serenity};
use ::serenity::all::{CreateEmbed, CreateEmbedFooter, Mentionable};
use std::time::Duration;

use super::bass::BassBoost;
use super::voice_state::{QueuePage, Song};
use super::{format_duration, format_duration_long, format_timestamp};

/// Accent colour of the music embeds.
const EMBED_COLOR: u32 = 0x5865F2;

/// Create a progress bar for the current track
fn format_progress_bar(position: Duration, total: Duration) -> String {
    const BAR_LENGTH: usize = 15;
    let progress = if total.as_secs() == 0 {
        0.0
    } else {
        (position.as_secs_f64() / total.as_secs_f64()).min(1.0)
    };

    let filled = (progress * BAR_LENGTH as f64).round() as usize;
    let empty = BAR_LENGTH - filled;

    format!("▬{}🔘{}▬", "▬".repeat(filled), "▬".repeat(empty))
}

/// Create an embed for the song that is playing. `position` adds a progress bar.
pub fn now_playing(song: &Song, position: Option<Duration>) -> CreateEmbed {
    let metadata = &song.metadata;
    let duration = metadata
        .duration
        .map(format_duration_long)
        .unwrap_or_else(|| "Unknown".to_string());

    let uploader = match (&metadata.uploader, &metadata.uploader_url) {
        (Some(name), Some(url)) => format!("[{}]({})", name, url),
        (Some(name), None) => name.clone(),
        _ => "Unknown".to_string(),
    };

    let mut description = format!("```css\n{}\n```", metadata.title);
    if let (Some(position), Some(total)) = (position, metadata.duration) {
        description.push_str(&format!(
            "{} `{}/{}`",
            format_progress_bar(position, total),
            format_duration(position),
            format_duration(total)
        ));
    }

    let mut embed = CreateEmbed::new()
        .title("Now playing")
        .description(description)
        .field("Duration", duration, true)
        .field("Requested by", song.requester.id.mention().to_string(), true)
        .field("Uploader", uploader, true)
        .color(EMBED_COLOR);

    if let Some(url) = &metadata.url {
        embed = embed.field("URL", format!("[Click]({})", url), true);
    }
    if let Some(thumbnail) = &metadata.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }

    embed
}

/// Reply for a song that was queued behind others.
pub fn added_to_queue(song: &Song) -> CreateReply {
    let uploader = song.metadata.uploader.as_deref().unwrap_or("Unknown");
    CreateReply::default().content(format!(
        "Added **{}** by **{}** to the queue",
        song.metadata.title, uploader
    ))
}

/// Reply for a playlist or album that was queued.
pub fn added_many_to_queue(count: usize) -> CreateReply {
    CreateReply::default().content(format!("Added **{}** song(s) to the queue", count))
}

pub fn paused(position: Duration, total: Option<Duration>) -> CreateReply {
    let total = total
        .map(format_timestamp)
        .unwrap_or_else(|| "--:--".to_string());
    CreateReply::default().content(format!(
        "Paused at {}/{}",
        format_timestamp(position),
        total
    ))
}

pub fn volume_changed(old: u16, new: u16) -> CreateReply {
    CreateReply::default().content(format!("Adjusting volume from `{}%` to `{}%`", old, new))
}

pub fn skipped() -> CreateReply {
    CreateReply::default().content("Skipping song ⏭")
}

pub fn already_voted() -> CreateReply {
    CreateReply::default()
        .content("You have already voted to skip this song.")
        .ephemeral(true)
}

pub fn skip_vote_added(votes: usize, required: usize) -> CreateReply {
    CreateReply::default().content(format!(
        "Skip vote added, currently at **{}/{}**",
        votes, required
    ))
}

pub fn bass_changed(old: BassBoost, new: BassBoost) -> CreateReply {
    CreateReply::default().content(format!("Bass changed from **{}** to **{}**", old, new))
}

pub fn stopped() -> CreateReply {
    CreateReply::default().content("Stopping song ⏹")
}

pub fn goodbye() -> CreateReply {
    CreateReply::default().content("Goodbye!")
}

pub fn loop_status(enabled: bool) -> CreateReply {
    let state = if enabled { "on" } else { "off" };
    CreateReply::default().content(format!("Turned {} looping", state))
}

pub fn empty_queue() -> CreateReply {
    CreateReply::default().content("Empty queue.")
}

/// Body text of a queue page.
fn queue_description(page: &QueuePage<'_>) -> String {
    let lines: Vec<String> = page
        .entries
        .iter()
        .map(|(index, song)| {
            format!(
                "`{}.` [**{}**]({})",
                index,
                song.metadata.title,
                song.metadata.url.as_deref().unwrap_or("#")
            )
        })
        .collect();

    format!("**{} tracks:**\n\n{}", page.total, lines.join("\n"))
}

/// Create an embed for one page of the queue
pub fn music_queue(page: &QueuePage<'_>) -> CreateEmbed {
    CreateEmbed::new()
        .description(queue_description(page))
        .footer(CreateEmbedFooter::new(format!(
            "Viewing page {}/{}",
            page.page, page.pages
        )))
        .color(EMBED_COLOR)
}

pub fn track_removed(song: &Song, position: usize) -> CreateReply {
    CreateReply::default().content(format!(
        "Removed **{}** from position {}",
        song.metadata.title, position
    ))
}

pub fn joined(channel: serenity::ChannelId) -> CreateReply {
    CreateReply::default().content(format!("Joined {}", channel.mention()))
}

pub fn nothing_playable() -> CreateReply {
    CreateReply::default().content("Nothing in the queue could be played.")
}

/// Channel message for a song that could not be played.
pub fn track_failed(song: &Song, reason: &str) -> String {
    format!(
        "Could not play **{}**, skipping: {}",
        song.metadata.title, reason
    )
}
