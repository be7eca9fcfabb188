//! Core error types for fleetroute-core.
//!
//! Local degenerate input (sub-threshold circles, empty clusters, duplicate
//! adds) is never an error; it shows up as `None` or an unchanged value.
//! Errors are reserved for caller mistakes that must be reported and for
//! failures at the sync boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::job::JobStatus;
use crate::sync::SyncError;

/// Core error type for fleetroute-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Job lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Sync boundary errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Coordinate text could not be parsed
    #[error("Invalid coordinate '{0}': expected \"lat,lng\"")]
    InvalidCoordinate(String),
}

impl ValidationError {
    pub(crate) fn out_of_bounds(collection: &str, index: usize, len: usize) -> Self {
        ValidationError::OutOfBounds {
            collection: collection.to_string(),
            index,
            len,
        }
    }
}

/// Job lifecycle errors.
#[derive(Error, Debug, PartialEq)]
pub enum LifecycleError {
    /// The job status machine does not allow this move
    #[error("Job '{job_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },

    /// Job id not present in the session
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Cluster id or number not present in the session
    #[error("Cluster not found: {0}")]
    ClusterNotFound(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
