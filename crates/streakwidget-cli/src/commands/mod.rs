pub mod config;
pub mod daemon;
pub mod evaluate;
pub mod refresh;
pub mod surface;

use std::sync::Arc;

use streakwidget_core::{
    Config, FileSurfaceRenderer, JobHost, ManualJobHost, SqliteStreakStore,
    StreakRefreshScheduler, SystemClock,
};

pub type CliScheduler = StreakRefreshScheduler<SqliteStreakStore, FileSurfaceRenderer, SystemClock>;

/// Scheduler over the default store and surfaces.
///
/// One-shot commands never register the recurring job, so they get a
/// manual host unless a real one is passed in.
pub fn open_scheduler(
    config: &Config,
    host: Option<Arc<dyn JobHost>>,
) -> Result<CliScheduler, Box<dyn std::error::Error>> {
    let store = SqliteStreakStore::open_default()?;
    let surfaces = FileSurfaceRenderer::open_default()?;
    let host = host.unwrap_or_else(|| Arc::new(ManualJobHost::new()) as Arc<dyn JobHost>);
    Ok(StreakRefreshScheduler::from_config(
        config,
        store,
        surfaces,
        SystemClock,
        host,
    ))
}
