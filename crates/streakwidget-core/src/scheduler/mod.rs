//! Daily streak refresh.
//!
//! [`StreakRefreshScheduler`] owns the recurring "DailyStreakCheck" job. Each
//! run reads the persisted streak, evaluates it against today's date and
//! renders the result to every attached surface. Runs never panic or return
//! errors to the host; they report a [`RunStatus`] the host can use to
//! decide on a retry.
//!
//! Lifecycle of the recurring job:
//!
//! ```text
//! Unregistered --enable_recurring--> Registered --disable_recurring--> Unregistered
//! ```
//!
//! [`run_once`](StreakRefreshScheduler::run_once) works in either state.

mod host;
mod manual;
mod tokio_host;

pub use host::{
    ExistingJobPolicy, JobCallback, JobHost, PeriodicJobSpec, Registration, RetryPolicy,
};
pub use manual::ManualJobHost;
pub use tokio_host::TokioJobHost;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::SchedulerError;
use crate::storage::Config;
use crate::store::{self, StoreKeys, StreakStore};
use crate::streak::{DisplayState, StreakRecord};
use crate::surface::{RenderRequest, SurfaceId, SurfaceRenderer};

/// Result of one refresh run, as reported to the job host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failure { reason: String },
}

impl RunStatus {
    pub fn failure(reason: impl Into<String>) -> Self {
        RunStatus::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }
}

/// Whether the recurring job is currently registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerLifecycle {
    Unregistered,
    Registered,
}

/// A surface that could not be rendered during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceFailure {
    pub id: SurfaceId,
    pub error: String,
}

/// Everything one completed run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub today: NaiveDate,
    pub record: StreakRecord,
    pub state: DisplayState,
    pub rendered: Vec<SurfaceId>,
    pub failed: Vec<SurfaceFailure>,
}

impl RunReport {
    pub fn status(&self) -> RunStatus {
        if self.failed.is_empty() {
            RunStatus::Success
        } else {
            RunStatus::failure(format!(
                "{} of {} surfaces failed to render",
                self.failed.len(),
                self.failed.len() + self.rendered.len()
            ))
        }
    }
}

/// Status of a run plus its report, when the run got as far as rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub report: Option<RunReport>,
}

/// The read, evaluate, render cycle shared between the scheduler and the
/// callback it hands to the host.
struct RefreshJob<S, R, C> {
    store: S,
    surfaces: R,
    clock: C,
    keys: StoreKeys,
}

impl<S, R, C> RefreshJob<S, R, C>
where
    S: StreakStore,
    R: SurfaceRenderer,
    C: Clock,
{
    fn run(&self) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let span = info_span!("streak_refresh", %run_id);
        let _enter = span.enter();

        match panic::catch_unwind(AssertUnwindSafe(|| self.refresh())) {
            Ok(Ok(report)) => {
                let status = report.status();
                match &status {
                    RunStatus::Success => info!(
                        count = report.state.count,
                        tier = ?report.state.visual_tier,
                        surfaces = report.rendered.len(),
                        "streak surfaces refreshed"
                    ),
                    RunStatus::Failure { reason } => warn!(%reason, "streak refresh incomplete"),
                }
                RunOutcome {
                    run_id,
                    status,
                    report: Some(report),
                }
            }
            Ok(Err(reason)) => {
                error!(%reason, "streak refresh failed");
                RunOutcome {
                    run_id,
                    status: RunStatus::failure(reason),
                    report: None,
                }
            }
            Err(payload) => {
                let reason = format!("refresh panicked: {}", panic_message(payload.as_ref()));
                error!(%reason, "streak refresh failed");
                RunOutcome {
                    run_id,
                    status: RunStatus::failure(reason),
                    report: None,
                }
            }
        }
    }

    fn refresh(&self) -> Result<RunReport, String> {
        let record = store::read_record(&self.store, &self.keys);
        let today = self.clock.today();
        let state = record.evaluate(today);
        debug!(?record, %today, ?state, "evaluated streak");

        let ids = self
            .surfaces
            .surface_ids()
            .map_err(|e| format!("failed to list surfaces: {e}"))?;

        let request = RenderRequest::from(&state);
        let mut rendered = Vec::with_capacity(ids.len());
        let mut failed = Vec::new();
        for id in ids {
            match self.surfaces.render(id, &request) {
                Ok(()) => rendered.push(id),
                Err(e) => {
                    warn!(surface = id, error = %e, "surface render failed");
                    failed.push(SurfaceFailure {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(RunReport {
            today,
            record,
            state,
            rendered,
            failed,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Owner of the recurring streak refresh and of on-demand refreshes.
pub struct StreakRefreshScheduler<S, R, C> {
    job: Arc<RefreshJob<S, R, C>>,
    host: Arc<dyn JobHost>,
    spec: PeriodicJobSpec,
}

impl<S, R, C> StreakRefreshScheduler<S, R, C>
where
    S: StreakStore + 'static,
    R: SurfaceRenderer + 'static,
    C: Clock + 'static,
{
    /// Scheduler with the default store keys and the daily job spec.
    pub fn new(store: S, surfaces: R, clock: C, host: Arc<dyn JobHost>) -> Self {
        Self::from_config(&Config::default(), store, surfaces, clock, host)
    }

    /// Scheduler using the store keys and job spec from `config`.
    pub fn from_config(
        config: &Config,
        store: S,
        surfaces: R,
        clock: C,
        host: Arc<dyn JobHost>,
    ) -> Self {
        Self {
            job: Arc::new(RefreshJob {
                store,
                surfaces,
                clock,
                keys: config.store.clone(),
            }),
            host,
            spec: config.job_spec(),
        }
    }

    pub fn spec(&self) -> &PeriodicJobSpec {
        &self.spec
    }

    pub fn store(&self) -> &S {
        &self.job.store
    }

    pub fn surfaces(&self) -> &R {
        &self.job.surfaces
    }

    pub fn lifecycle(&self) -> SchedulerLifecycle {
        if self.host.is_registered(&self.spec.name) {
            SchedulerLifecycle::Registered
        } else {
            SchedulerLifecycle::Unregistered
        }
    }

    /// Register the recurring refresh. A no-op if it is already registered.
    ///
    /// # Errors
    /// Returns an error if the host rejects the registration.
    pub fn enable_recurring(&self) -> Result<Registration, SchedulerError> {
        let job = Arc::clone(&self.job);
        let callback: JobCallback = Arc::new(move || job.run().status);
        let registration = self
            .host
            .register_periodic(&self.spec, callback)
            .map_err(|source| SchedulerError::Register {
                name: self.spec.name.clone(),
                source,
            })?;
        info!(job = %self.spec.name, ?registration, "recurring streak refresh enabled");
        Ok(registration)
    }

    /// Cancel the recurring refresh. Returns `false` if it was not registered.
    ///
    /// # Errors
    /// Returns an error if the host fails to cancel the job.
    pub fn disable_recurring(&self) -> Result<bool, SchedulerError> {
        let cancelled = self
            .host
            .cancel(&self.spec.name)
            .map_err(|source| SchedulerError::Cancel {
                name: self.spec.name.clone(),
                source,
            })?;
        info!(job = %self.spec.name, cancelled, "recurring streak refresh disabled");
        Ok(cancelled)
    }

    /// Refresh every surface now.
    pub fn run_once(&self) -> RunStatus {
        self.job.run().status
    }

    /// Refresh every surface now and return what the run did.
    pub fn run_once_report(&self) -> RunOutcome {
        self.job.run()
    }

    /// The first surface was placed.
    ///
    /// # Errors
    /// Returns an error if the recurring job cannot be registered.
    pub fn on_enabled(&self) -> Result<Registration, SchedulerError> {
        debug!("first streak surface placed");
        self.enable_recurring()
    }

    /// Surfaces were placed or asked to redraw.
    pub fn on_update(&self, ids: &[SurfaceId]) -> RunStatus {
        debug!(?ids, "streak surfaces requested update");
        self.run_once()
    }

    /// The last surface was removed.
    ///
    /// # Errors
    /// Returns an error if the recurring job cannot be cancelled.
    pub fn on_disabled(&self) -> Result<bool, SchedulerError> {
        debug!("last streak surface removed");
        self.disable_recurring()
    }
}
