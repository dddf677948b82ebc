use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::debug;

use super::host::{ExistingJobPolicy, JobCallback, JobHost, PeriodicJobSpec, Registration};
use super::RunStatus;
use crate::error::HostError;

struct ManualJob {
    spec: PeriodicJobSpec,
    callback: JobCallback,
}

/// A job host that never fires on its own; jobs run when [`fire`](Self::fire)
/// is called.
#[derive(Default)]
pub struct ManualJobHost {
    jobs: Mutex<BTreeMap<String, ManualJob>>,
}

impl ManualJobHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the job registered under `name` once, as its period elapsing would.
    pub fn fire(&self, name: &str) -> Option<RunStatus> {
        let callback = {
            let jobs = self.jobs.lock().ok()?;
            jobs.get(name)?.callback.clone()
        };
        Some(callback())
    }

    pub fn registered_names(&self) -> Vec<String> {
        self.jobs
            .lock()
            .map(|jobs| jobs.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn spec(&self, name: &str) -> Option<PeriodicJobSpec> {
        let jobs = self.jobs.lock().ok()?;
        jobs.get(name).map(|job| job.spec.clone())
    }
}

impl JobHost for ManualJobHost {
    fn register_periodic(
        &self,
        spec: &PeriodicJobSpec,
        callback: JobCallback,
    ) -> Result<Registration, HostError> {
        let mut jobs = self.jobs.lock().map_err(|_| HostError::Rejected {
            name: spec.name.clone(),
            message: "job table lock poisoned".into(),
        })?;

        let outcome = match (jobs.contains_key(&spec.name), spec.policy) {
            (true, ExistingJobPolicy::Keep) => return Ok(Registration::AlreadyRegistered),
            (true, ExistingJobPolicy::Replace) => Registration::Replaced,
            (false, _) => Registration::Registered,
        };
        debug!(job = %spec.name, ?outcome, "manual job registered");
        jobs.insert(
            spec.name.clone(),
            ManualJob {
                spec: spec.clone(),
                callback,
            },
        );
        Ok(outcome)
    }

    fn cancel(&self, name: &str) -> Result<bool, HostError> {
        let mut jobs = self.jobs.lock().map_err(|_| HostError::Rejected {
            name: name.to_string(),
            message: "job table lock poisoned".into(),
        })?;
        Ok(jobs.remove(name).is_some())
    }

    fn is_registered(&self, name: &str) -> bool {
        self.jobs
            .lock()
            .map(|jobs| jobs.contains_key(name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_callback(counter: Arc<AtomicUsize>) -> JobCallback {
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            RunStatus::Success
        })
    }

    #[test]
    fn keep_policy_leaves_first_callback() {
        let host = ManualJobHost::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let spec = PeriodicJobSpec::daily_streak_check();

        assert_eq!(
            host.register_periodic(&spec, counting_callback(first.clone())).unwrap(),
            Registration::Registered
        );
        assert_eq!(
            host.register_periodic(&spec, counting_callback(second.clone())).unwrap(),
            Registration::AlreadyRegistered
        );

        assert_eq!(host.fire(&spec.name), Some(RunStatus::Success));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 0);
        assert_eq!(host.registered_names(), vec![spec.name.clone()]);
    }

    #[test]
    fn replace_policy_swaps_callback() {
        let host = ManualJobHost::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let spec = PeriodicJobSpec {
            policy: ExistingJobPolicy::Replace,
            ..PeriodicJobSpec::daily_streak_check()
        };

        host.register_periodic(&spec, counting_callback(first.clone())).unwrap();
        assert_eq!(
            host.register_periodic(&spec, counting_callback(second.clone())).unwrap(),
            Registration::Replaced
        );
        host.fire(&spec.name);
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_and_fire_unknown() {
        let host = ManualJobHost::new();
        assert!(!host.cancel("nothing").unwrap());
        assert_eq!(host.fire("nothing"), None);
        assert!(!host.is_registered("nothing"));
    }
}
