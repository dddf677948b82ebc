use serde_json::json;
use streakwidget_core::{store, surface::SurfaceRenderer, Clock, Config, RunStatus, SystemClock};

use super::open_scheduler;

/// One refresh of every attached surface.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scheduler = open_scheduler(&config, None)?;

    let outcome = scheduler.run_once_report();
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    match outcome.status {
        RunStatus::Success => Ok(()),
        RunStatus::Failure { reason } => Err(reason.into()),
    }
}

/// Print the stored streak and the state it evaluates to, without rendering.
pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scheduler = open_scheduler(&config, None)?;

    let record = store::read_record(scheduler.store(), &config.store);
    let today = SystemClock.today();
    let state = record.evaluate(today);
    let surfaces = scheduler.surfaces().surface_ids()?;

    let report = json!({
        "today": today,
        "record": record,
        "state": state,
        "surfaces": surfaces,
        "job": scheduler.spec().name,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
