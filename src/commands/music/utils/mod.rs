use std::time::Duration;

// Export music utilities
pub mod bass;
pub mod embedded_messages;
pub mod event_handlers;
pub mod music_manager;
pub mod voice_state;

/// Format a duration into a human-readable string (e.g., "3:45" or "1:23:45")
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Format a playback position as `mm:ss`, minutes keep counting past the hour.
pub fn format_timestamp(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Spell a duration out, e.g. "1 hour, 2 minutes, 5 seconds". Zero units are left out.
pub fn format_duration_long(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let units = [
        (total_seconds / 86_400, "day"),
        ((total_seconds % 86_400) / 3600, "hour"),
        ((total_seconds % 3600) / 60, "minute"),
        (total_seconds % 60, "second"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| {
            let plural = if *value == 1 { "" } else { "s" };
            format!("{} {}{}", value, unit, plural)
        })
        .collect();

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(", ")
    }
}
