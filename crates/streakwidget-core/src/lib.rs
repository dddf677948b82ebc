//! # Streakwidget Core Library
//!
//! Keeps the daily streak widget on the home screen current while the app
//! itself is not running. The app records the streak count and the time of
//! the last activity; once a day this library reads them back, decides
//! whether the streak is still alive, and redraws every placed widget.
//!
//! ## Architecture
//!
//! - **Evaluation**: a pure function from (count, last activity, today) to
//!   the [`DisplayState`] a widget shows
//! - **Scheduling**: [`StreakRefreshScheduler`] registers one named daily
//!   job with a [`JobHost`] and runs read, evaluate, render cycles
//! - **Store**: read-only access to the values the app persisted
//! - **Surfaces**: write-only access to the placed widgets
//!
//! ## Key Components
//!
//! - [`evaluate`]: streak danger evaluation
//! - [`StreakRefreshScheduler`]: recurring and on-demand refresh
//! - [`TokioJobHost`]: in-process periodic job host
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod storage;
pub mod store;
pub mod streak;
pub mod surface;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, HostError, RenderError, SchedulerError, StoreError};
pub use scheduler::{
    ExistingJobPolicy, JobHost, ManualJobHost, PeriodicJobSpec, Registration, RetryPolicy,
    RunOutcome, RunReport, RunStatus, SchedulerLifecycle, StreakRefreshScheduler, TokioJobHost,
};
pub use storage::{data_dir, Config};
pub use store::{MemoryStreakStore, SqliteStreakStore, StoreKeys, StreakStore};
pub use streak::{evaluate, parse_activity_date, DisplayState, StreakLabel, StreakRecord, VisualTier};
pub use surface::{
    FileSurfaceRenderer, FlameAsset, MemorySurfaceRenderer, RenderRequest, SurfaceId,
    SurfaceRenderer,
};
