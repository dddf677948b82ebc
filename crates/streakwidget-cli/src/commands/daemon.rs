//! Foreground host for the daily refresh.
//!
//! Registers the recurring job with an in-process tokio host, refreshes
//! once immediately, then waits for Ctrl-C and cancels the job.

use std::sync::Arc;

use streakwidget_core::{Config, JobHost, TokioJobHost};
use tracing::info;

use super::open_scheduler;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async {
        let host: Arc<dyn JobHost> = Arc::new(TokioJobHost::current(config.retry_policy())?);
        let scheduler = Arc::new(open_scheduler(&config, Some(host))?);

        let registration = scheduler.on_enabled()?;
        info!(?registration, job = %scheduler.spec().name, "daemon started");
        let initial = Arc::clone(&scheduler);
        let status = tokio::task::spawn_blocking(move || initial.run_once()).await?;
        info!(?status, "initial refresh finished");

        tokio::signal::ctrl_c().await?;
        scheduler.on_disabled()?;
        info!("daemon stopped");
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
