//! Read access to the persisted streak values.
//!
//! The app writes the streak count and the last activity timestamp into a
//! namespaced key-value store; this module only ever reads them.

mod memory;
mod sqlite;

pub use memory::MemoryStreakStore;
pub use sqlite::SqliteStreakStore;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::streak::{parse_activity_date, StreakRecord};

/// Raw key-value access to the persisted store.
pub trait StreakStore: Send + Sync {
    /// Read the raw value stored under `key`, `None` when the key is missing.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

impl<T: StreakStore + ?Sized> StreakStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }
}

/// Namespaced key names of the two streak values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreKeys {
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_count_key")]
    pub count_key: String,
    #[serde(default = "default_last_activity_key")]
    pub last_activity_key: String,
}

fn default_namespace() -> String {
    "flutter".into()
}
fn default_count_key() -> String {
    "current_streak".into()
}
fn default_last_activity_key() -> String {
    "last_login_date".into()
}

impl Default for StoreKeys {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            count_key: default_count_key(),
            last_activity_key: default_last_activity_key(),
        }
    }
}

impl StoreKeys {
    fn qualify(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.namespace, key)
        }
    }

    /// Fully qualified key of the streak count.
    pub fn count(&self) -> String {
        self.qualify(&self.count_key)
    }

    /// Fully qualified key of the last activity timestamp.
    pub fn last_activity(&self) -> String {
        self.qualify(&self.last_activity_key)
    }
}

/// Read the streak record, defaulting anything missing or unreadable.
///
/// Never fails: a missing or broken count reads as 0, a missing or
/// malformed timestamp reads as no prior activity.
pub fn read_record<S: StreakStore + ?Sized>(store: &S, keys: &StoreKeys) -> StreakRecord {
    let count_key = keys.count();
    let streak_count = match store.get(&count_key) {
        Ok(Some(raw)) => parse_count(&count_key, &raw),
        Ok(None) => 0,
        Err(e) => {
            warn!(key = %count_key, error = %e, "failed to read streak count, using 0");
            0
        }
    };

    let activity_key = keys.last_activity();
    let last_activity_date = match store.get(&activity_key) {
        Ok(Some(raw)) => parse_activity_date(&raw),
        Ok(None) => None,
        Err(e) => {
            warn!(key = %activity_key, error = %e, "failed to read last activity, treating as absent");
            None
        }
    };

    debug!(streak_count, ?last_activity_date, "read streak record");
    StreakRecord {
        streak_count,
        last_activity_date,
    }
}

fn parse_count(key: &str, raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n;
    }
    // Some writers persist whole numbers as floats
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
        _ => {
            warn!(key = %key, value = %raw, "unparseable streak count, using 0");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_keys_match_app_namespace() {
        let keys = StoreKeys::default();
        assert_eq!(keys.count(), "flutter.current_streak");
        assert_eq!(keys.last_activity(), "flutter.last_login_date");
    }

    #[test]
    fn empty_namespace_uses_bare_keys() {
        let keys = StoreKeys {
            namespace: String::new(),
            ..StoreKeys::default()
        };
        assert_eq!(keys.count(), "current_streak");
    }

    #[test]
    fn missing_keys_read_as_defaults() {
        let store = MemoryStreakStore::new();
        assert_eq!(read_record(&store, &StoreKeys::default()), StreakRecord::default());
    }

    #[test]
    fn reads_both_values() {
        let keys = StoreKeys::default();
        let store = MemoryStreakStore::new();
        store.set(&keys.count(), "7");
        store.set(&keys.last_activity(), "2024-03-10T09:00:00.000");

        let record = read_record(&store, &keys);
        assert_eq!(record.streak_count, 7);
        assert_eq!(record.last_activity_date, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn malformed_values_fall_back() {
        let keys = StoreKeys::default();
        let store = MemoryStreakStore::new();
        store.set(&keys.count(), "lots");
        store.set(&keys.last_activity(), "not a date");

        assert_eq!(read_record(&store, &keys), StreakRecord::default());
    }

    #[test]
    fn whole_float_counts_are_accepted() {
        assert_eq!(parse_count("k", "3.0"), 3);
        assert_eq!(parse_count("k", "3.5"), 0);
        assert_eq!(parse_count("k", " -2 "), -2);
    }

    #[test]
    fn read_failure_defaults() {
        let keys = StoreKeys::default();
        let store = MemoryStreakStore::new();
        store.set(&keys.count(), "4");
        store.set_unavailable(true);

        assert_eq!(read_record(&store, &keys), StreakRecord::default());
    }
}
