//! Provides functions for interacting with the application's SQLite database.
//! Stores per-guild playback settings (volume and bass preset) so they survive
//! restarts.

use rusqlite::{Connection, OptionalExtension, Result as SqlResult, params};
use serenity::model::id::GuildId;
use std::path::Path;
use std::sync::Once;
use tracing::error;

use crate::commands::music::utils::bass::BassBoost;

/// Ensures that database table creation logic runs only once.
static DB_INIT: Once = Once::new();

/// Playback settings stored for a guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuildSettings {
    /// Volume percentage.
    pub volume: u16,
    /// Active bass preset.
    pub bass: BassBoost,
}

/// Initializes the database by ensuring the necessary tables are created.
/// Uses `std::sync::Once` to guarantee table creation happens only once per application run.
pub fn init_db(path: &Path) -> SqlResult<()> {
    let mut result = Ok(());
    DB_INIT.call_once(|| {
        result = Connection::open(path).and_then(|conn| create_tables(&conn));
        if let Err(e) = &result {
            error!("Failed to create database tables: {}", e);
        }
    });
    result
}

/// Creates the `guild_settings` table if it doesn't exist.
pub fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS guild_settings (
            guild_id INTEGER PRIMARY KEY,
            volume INTEGER NOT NULL,
            bass TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

/// Reads the settings of a guild, `None` when nothing was stored yet.
///
/// An unknown preset name falls back to `off`.
pub fn read_guild_settings(conn: &Connection, guild_id: GuildId) -> SqlResult<Option<GuildSettings>> {
    conn.query_row(
        "SELECT volume, bass FROM guild_settings WHERE guild_id = ?1",
        params![guild_id.get()],
        |row| {
            let volume: u16 = row.get(0)?;
            let bass: String = row.get(1)?;
            Ok(GuildSettings {
                volume,
                bass: bass.parse().unwrap_or_default(),
            })
        },
    )
    .optional()
}

/// Inserts or replaces the settings of a guild.
pub fn write_guild_settings(
    conn: &Connection,
    guild_id: GuildId,
    settings: GuildSettings,
) -> SqlResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO guild_settings (guild_id, volume, bass) VALUES (?1, ?2, ?3)",
        params![guild_id.get(), settings.volume, settings.bass.name()],
    )?;
    Ok(())
}

/// Loads a guild's settings from the database file at `path`.
pub fn get_guild_settings(path: &Path, guild_id: GuildId) -> SqlResult<Option<GuildSettings>> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    read_guild_settings(&conn, guild_id)
}

/// Stores a guild's settings in the database file at `path`.
pub fn set_guild_settings(path: &Path, guild_id: GuildId, settings: GuildSettings) -> SqlResult<()> {
    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    write_guild_settings(&conn, guild_id, settings)
}
