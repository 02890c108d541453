//! This module aggregates utility submodules used throughout the application.

/// Utilities for interacting with the application's SQLite database.
pub mod database;
