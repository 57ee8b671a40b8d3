pub mod config;
pub mod goal;
pub mod stats;
pub mod task;
pub mod timer;

use chrono::Local;
use nosofy_core::{Config, Dashboard, Database};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Dashboard over the on-disk database, scoring in the local time zone.
pub fn open_dashboard() -> Result<Dashboard<Database, Local>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    Ok(Dashboard::new(db, config, Local))
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
