//! TOML-based application configuration.
//!
//! Stores:
//! - The store namespace and key names the app writes the streak under
//! - The recurring refresh job (name, period, flex window)
//! - Retry behaviour of the in-process job host
//!
//! Configuration is stored at `~/.config/streakwidget/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::scheduler::{ExistingJobPolicy, PeriodicJobSpec, RetryPolicy};
use crate::store::StoreKeys;

/// Recurring refresh job configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_job_name")]
    pub job_name: String,
    #[serde(default = "default_period_hours")]
    pub period_hours: u64,
    #[serde(default = "default_flex_minutes")]
    pub flex_minutes: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/streakwidget/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreKeys,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

/// Longest accepted refresh period, one leap year.
pub const MAX_PERIOD_HOURS: u64 = 366 * 24;
/// Longest accepted delay before the first retry, one day.
pub const MAX_RETRY_BACKOFF_SECS: u64 = 24 * 3600;

fn default_job_name() -> String {
    PeriodicJobSpec::DAILY_STREAK_CHECK.into()
}
fn default_period_hours() -> u64 {
    24
}
fn default_flex_minutes() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}
fn default_retry_backoff_secs() -> u64 {
    30
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            period_hours: default_period_hours(),
            flex_minutes: default_flex_minutes(),
            max_retries: default_max_retries(),
            retry_backoff_secs: default_retry_backoff_secs(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location, `<data_dir>/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/streakwidget"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing the defaults there when the file is missing.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be read or parsed, or
    /// fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without persisting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or is out of range.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.into(),
            message,
        };
        let schedule = &self.schedule;
        if schedule.period_hours == 0 {
            return Err(invalid(
                "schedule.period_hours",
                "period must be at least one hour".into(),
            ));
        }
        if schedule.period_hours > MAX_PERIOD_HOURS {
            return Err(invalid(
                "schedule.period_hours",
                format!("period must be at most {MAX_PERIOD_HOURS} hours"),
            ));
        }
        if schedule.flex_minutes > MAX_PERIOD_HOURS * 60 {
            return Err(invalid(
                "schedule.flex_minutes",
                format!("flex must be at most {} minutes", MAX_PERIOD_HOURS * 60),
            ));
        }
        if schedule.retry_backoff_secs > MAX_RETRY_BACKOFF_SECS {
            return Err(invalid(
                "schedule.retry_backoff_secs",
                format!("backoff must be at most {MAX_RETRY_BACKOFF_SECS} seconds"),
            ));
        }
        if self.schedule.job_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "schedule.job_name".into(),
                message: "job name must not be empty".into(),
            });
        }
        Ok(())
    }

    /// The recurring refresh job described by this config.
    ///
    /// A flex window longer than the period is clamped to the period.
    pub fn job_spec(&self) -> PeriodicJobSpec {
        let period = Duration::from_secs(self.schedule.period_hours.saturating_mul(3600));
        let flex = Duration::from_secs(self.schedule.flex_minutes.saturating_mul(60)).min(period);
        PeriodicJobSpec {
            name: self.schedule.job_name.clone(),
            period,
            flex,
            policy: ExistingJobPolicy::Keep,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.schedule.max_retries,
            backoff: Duration::from_secs(self.schedule.retry_backoff_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.store.namespace, "flutter");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[schedule]\nflex_minutes = 15\n").unwrap();
        assert_eq!(parsed.schedule.flex_minutes, 15);
        assert_eq!(parsed.schedule.period_hours, 24);
        assert_eq!(parsed.store.count_key, "current_streak");
    }

    #[test]
    fn default_job_spec_is_daily_with_one_hour_flex() {
        let spec = Config::default().job_spec();
        assert_eq!(spec.name, "DailyStreakCheck");
        assert_eq!(spec.period, Duration::from_secs(24 * 3600));
        assert_eq!(spec.flex, Duration::from_secs(3600));
        assert_eq!(spec.policy, ExistingJobPolicy::Keep);
        assert_eq!(spec, PeriodicJobSpec::daily_streak_check());
    }

    #[test]
    fn flex_is_clamped_to_period() {
        let mut cfg = Config::default();
        cfg.apply("schedule.period_hours", "1").unwrap();
        cfg.apply("schedule.flex_minutes", "600").unwrap();
        assert_eq!(cfg.job_spec().flex, Duration::from_secs(3600));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("store.namespace").as_deref(), Some("flutter"));
        assert_eq!(cfg.get("schedule.period_hours").as_deref(), Some("24"));
        assert!(cfg.get("schedule.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_string_and_number() {
        let mut cfg = Config::default();
        cfg.apply("store.namespace", "app").unwrap();
        cfg.apply("schedule.max_retries", "5").unwrap();
        assert_eq!(cfg.store.count(), "app.current_streak");
        assert_eq!(cfg.schedule.max_retries, 5);
    }

    #[test]
    fn apply_rejects_unknown_and_invalid_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("schedule.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.apply("schedule.period_hours", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("schedule.period_hours", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.apply("schedule", "x"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn apply_rejects_durations_the_host_cannot_schedule() {
        let mut cfg = Config::default();
        for (key, value) in [
            ("schedule.period_hours", "18446744073709551615"),
            ("schedule.period_hours", "1000000000000"),
            ("schedule.period_hours", "8785"),
            ("schedule.flex_minutes", "18446744073709551615"),
            ("schedule.retry_backoff_secs", "18446744073709551615"),
            ("schedule.retry_backoff_secs", "86401"),
        ] {
            assert!(
                matches!(cfg.apply(key, value), Err(ConfigError::InvalidValue { .. })),
                "{key} = {value} was accepted"
            );
        }
        assert_eq!(cfg, Config::default());

        cfg.apply("schedule.period_hours", &MAX_PERIOD_HOURS.to_string())
            .unwrap();
        cfg.apply("schedule.retry_backoff_secs", "86400").unwrap();
        assert_eq!(
            cfg.job_spec().period,
            Duration::from_secs(MAX_PERIOD_HOURS * 3600)
        );
    }

    #[test]
    fn load_from_rejects_out_of_range_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[schedule]\nretry_backoff_secs = 9999999999\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("schedule.flex_minutes", "30").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().schedule.flex_minutes, 30);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "schedule = 3").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn load_from_keeps_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let bytes = b"[store]\nnamespace = \"\xff\xfe\"\n";
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }
}
