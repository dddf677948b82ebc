//! The recurring-job facility the refresh scheduler registers with.
//!
//! A host runs named periodic jobs. At most one job exists per name; what
//! happens when a name is registered twice is decided by the job's
//! [`ExistingJobPolicy`].

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::RunStatus;
use crate::error::HostError;

/// Callback a host invokes every time a job fires.
pub type JobCallback = Arc<dyn Fn() -> RunStatus + Send + Sync>;

/// What to do when a job with the same name is already registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingJobPolicy {
    /// Leave the existing job untouched
    Keep,
    /// Cancel the existing job and install the new one
    Replace,
}

/// A named periodic job.
///
/// The job may fire anywhere in the last `flex` of every `period`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicJobSpec {
    pub name: String,
    pub period: Duration,
    pub flex: Duration,
    pub policy: ExistingJobPolicy,
}

impl PeriodicJobSpec {
    pub const DAILY_STREAK_CHECK: &'static str = "DailyStreakCheck";

    /// Daily refresh with a one hour flex window, keeping existing jobs.
    pub fn daily_streak_check() -> Self {
        Self {
            name: Self::DAILY_STREAK_CHECK.to_string(),
            period: Duration::from_secs(24 * 60 * 60),
            flex: Duration::from_secs(60 * 60),
            policy: ExistingJobPolicy::Keep,
        }
    }

    /// Offset into each period where the flex window opens.
    pub fn window_start(&self) -> Duration {
        self.period.saturating_sub(self.flex)
    }
}

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Registered,
    /// An equivalent job was already registered and was kept
    AlreadyRegistered,
    /// An existing job was cancelled in favour of the new one
    Replaced,
}

/// Retries a host performs after a failed run, before the next period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(1u32 << attempt.min(16))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(30),
        }
    }
}

/// A facility that runs named periodic jobs.
pub trait JobHost: Send + Sync {
    /// Register a periodic job, honouring `spec.policy` for existing names.
    fn register_periodic(
        &self,
        spec: &PeriodicJobSpec,
        callback: JobCallback,
    ) -> Result<Registration, HostError>;

    /// Cancel the job registered under `name`. Returns `false` if none was.
    fn cancel(&self, name: &str) -> Result<bool, HostError>;

    fn is_registered(&self, name: &str) -> bool;
}
