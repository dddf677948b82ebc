mod config;

pub use config::{Config, ScheduleConfig, MAX_PERIOD_HOURS, MAX_RETRY_BACKOFF_SECS};

use std::path::PathBuf;

/// Returns `~/.config/streakwidget[-dev]/` based on STREAKWIDGET_ENV.
///
/// Set STREAKWIDGET_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STREAKWIDGET_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("streakwidget-dev")
    } else {
        base_dir.join("streakwidget")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
