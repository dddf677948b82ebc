//! Core error types for streakwidget-core.
//!
//! Every collaborator boundary (store, surfaces, job host, config) gets its
//! own thiserror enum; [`CoreError`] gathers them for callers that do not
//! care which one failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::surface::SurfaceId;

/// Core error type for streakwidget-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persisted store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Display surface errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Recurring job host errors
    #[error("Job host error: {0}")]
    Host(#[from] HostError),

    /// Scheduler lifecycle errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reading the persisted streak store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Store query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Data directory could not be resolved
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// The store cannot be read right now
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors dispatching a render to a display surface.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Surface IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize render: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The surface was removed between listing and rendering
    #[error("Surface {0} is no longer attached")]
    Detached(SurfaceId),

    /// The surface refused the update
    #[error("Surface {id} rejected the update: {message}")]
    Rejected { id: SurfaceId, message: String },
}

/// Errors from the recurring job host.
#[derive(Error, Debug)]
pub enum HostError {
    /// No runtime is available to drive the job
    #[error("Job runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// The host refused the registration
    #[error("Job '{name}' rejected: {message}")]
    Rejected { name: String, message: String },
}

/// Scheduler lifecycle errors.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to register '{name}': {source}")]
    Register {
        name: String,
        #[source]
        source: HostError,
    },

    #[error("Failed to cancel '{name}': {source}")]
    Cancel {
        name: String,
        #[source]
        source: HostError,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
