mod config;
pub mod database;
mod host;

pub use config::{CalendarConfig, Config};
pub use database::{Database, DeliveryRecord, TimerRecord};
pub use host::SqliteHost;

use std::path::PathBuf;

use crate::error::StoreError;

/// Returns `~/.config/wellcadence[-dev]/` based on WELLCADENCE_ENV.
///
/// Set WELLCADENCE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WELLCADENCE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wellcadence-dev")
    } else {
        base_dir.join("wellcadence")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
