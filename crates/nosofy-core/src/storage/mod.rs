mod config;
pub mod database;

pub use config::{Config, GoalsConfig, StreakConfig, TimerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::DatabaseError;

/// Per-collection record access.
///
/// `add` fails if the record carries an id that is already taken; `put`
/// inserts or replaces. Both return the record's id.
pub trait Store<T> {
    fn get(&self, id: i64) -> Result<Option<T>, DatabaseError>;
    fn get_all(&self) -> Result<Vec<T>, DatabaseError>;
    fn add(&self, record: &T) -> Result<i64, DatabaseError>;
    fn put(&self, record: &T) -> Result<i64, DatabaseError>;
    fn delete(&self, id: i64) -> Result<(), DatabaseError>;
}

/// Returns the data directory, creating it if needed.
///
/// `NOSOFY_DATA_DIR` wins when set. Otherwise `~/.config/nosofy[-dev]/`,
/// with the `-dev` suffix when `NOSOFY_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("NOSOFY_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("NOSOFY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("nosofy-dev")
            } else {
                base_dir.join("nosofy")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
