//! In-process job host driven by tokio timers.
//!
//! Every job is one task that sleeps into the flex window of the current
//! period, runs the callback on the blocking pool and, if the run failed,
//! retries with backoff until the period ends. Runs of one job never
//! overlap because the task awaits each run before scheduling the next.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::host::{
    ExistingJobPolicy, JobCallback, JobHost, PeriodicJobSpec, Registration, RetryPolicy,
};
use super::RunStatus;
use crate::error::HostError;

/// Job host running periodic jobs as tokio tasks.
pub struct TokioJobHost {
    handle: Handle,
    retry: RetryPolicy,
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl TokioJobHost {
    pub fn new(handle: Handle, retry: RetryPolicy) -> Self {
        Self {
            handle,
            retry,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Host on the runtime of the calling context.
    ///
    /// # Errors
    /// Returns an error when called outside a tokio runtime.
    pub fn current(retry: RetryPolicy) -> Result<Self, HostError> {
        let handle =
            Handle::try_current().map_err(|e| HostError::RuntimeUnavailable(e.to_string()))?;
        Ok(Self::new(handle, retry))
    }

    fn lock_jobs(
        &self,
        name: &str,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, JoinHandle<()>>>, HostError> {
        self.jobs.lock().map_err(|_| HostError::Rejected {
            name: name.to_string(),
            message: "job table lock poisoned".into(),
        })
    }
}

impl JobHost for TokioJobHost {
    fn register_periodic(
        &self,
        spec: &PeriodicJobSpec,
        callback: JobCallback,
    ) -> Result<Registration, HostError> {
        if spec.period.is_zero() {
            return Err(HostError::Rejected {
                name: spec.name.clone(),
                message: "period must be non-zero".into(),
            });
        }
        if Instant::now().checked_add(spec.period).is_none() {
            return Err(HostError::Rejected {
                name: spec.name.clone(),
                message: format!("period of {}s is too long to schedule", spec.period.as_secs()),
            });
        }

        let mut jobs = self.lock_jobs(&spec.name)?;
        let live = jobs
            .get(&spec.name)
            .is_some_and(|task| !task.is_finished());

        let outcome = match (live, spec.policy) {
            (true, ExistingJobPolicy::Keep) => {
                debug!(job = %spec.name, "job already scheduled, keeping it");
                return Ok(Registration::AlreadyRegistered);
            }
            (true, ExistingJobPolicy::Replace) => {
                if let Some(task) = jobs.remove(&spec.name) {
                    task.abort();
                }
                Registration::Replaced
            }
            (false, _) => Registration::Registered,
        };

        let task = self
            .handle
            .spawn(drive_job(spec.clone(), callback, self.retry));
        jobs.insert(spec.name.clone(), task);
        info!(
            job = %spec.name,
            period_secs = spec.period.as_secs(),
            flex_secs = spec.flex.as_secs(),
            ?outcome,
            "periodic job scheduled"
        );
        Ok(outcome)
    }

    fn cancel(&self, name: &str) -> Result<bool, HostError> {
        let mut jobs = self.lock_jobs(name)?;
        match jobs.remove(name) {
            Some(task) => {
                let was_live = !task.is_finished();
                task.abort();
                info!(job = %name, "periodic job cancelled");
                Ok(was_live)
            }
            None => Ok(false),
        }
    }

    fn is_registered(&self, name: &str) -> bool {
        self.jobs
            .lock()
            .map(|jobs| jobs.get(name).is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for TokioJobHost {
    fn drop(&mut self) {
        if let Ok(jobs) = self.jobs.get_mut() {
            for (_, task) in jobs.drain() {
                task.abort();
            }
        }
    }
}

/// Random point inside the flex window of a period, as an offset from the
/// period start.
fn fire_offset(spec: &PeriodicJobSpec) -> Duration {
    let flex_ms = u64::try_from(spec.flex.as_millis()).unwrap_or(u64::MAX);
    let jitter = if flex_ms == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..=flex_ms)
    };
    (spec.window_start() + Duration::from_millis(jitter)).min(spec.period)
}

async fn run_callback(callback: &JobCallback) -> RunStatus {
    let callback = callback.clone();
    match tokio::task::spawn_blocking(move || callback()).await {
        Ok(status) => status,
        Err(e) => RunStatus::failure(format!("refresh task did not complete: {e}")),
    }
}

async fn drive_job(spec: PeriodicJobSpec, callback: JobCallback, retry: RetryPolicy) {
    let mut period_start = Instant::now();
    loop {
        let Some(period_end) = period_start.checked_add(spec.period) else {
            warn!(job = %spec.name, "period end is past the clock range, job stopped");
            return;
        };
        let fire_at = period_start + fire_offset(&spec);
        let delay = fire_at.saturating_duration_since(Instant::now());
        debug!(job = %spec.name, delay_secs = delay.as_secs(), "next run");
        sleep_until(fire_at).await;

        let mut attempt = 0;
        loop {
            let status = run_callback(&callback).await;
            let RunStatus::Failure { reason } = status else {
                break;
            };
            if attempt >= retry.max_retries {
                warn!(job = %spec.name, %reason, "run failed, retries exhausted until next period");
                break;
            }
            let retry_at = Instant::now()
                .checked_add(retry.backoff_for(attempt))
                .unwrap_or(period_end);
            if retry_at >= period_end {
                warn!(job = %spec.name, %reason, "run failed, no time left to retry this period");
                break;
            }
            attempt += 1;
            warn!(job = %spec.name, %reason, attempt, "run failed, retrying");
            sleep_until(retry_at).await;
        }

        period_start = period_end;
    }
}
