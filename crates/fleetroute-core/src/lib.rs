//! # Fleetroute Core Library
//!
//! Route-composition engine for field-service fleets. An operator lassoes
//! pending jobs on a map into clusters, confirms them into prioritized
//! groups, completes them, and composes manual routes by hand. All of it is
//! available through a standalone CLI binary over this library.
//!
//! ## Architecture
//!
//! - **Geo**: haversine distance and circle containment
//! - **Gesture**: press/drag/release state machine producing a lasso circle
//! - **Clusters**: lasso capture, confirmation with dense priorities, completion
//! - **Route**: explicit job order with add/remove/move and duration estimate
//! - **Session**: explicit context owning all of the above, emitting [`Event`]s
//! - **Sync**: async write-backs to the job store with a manual-retry outbox
//! - **Storage**: TOML configuration and the local session file
//!
//! ## Key Components
//!
//! - [`Session`]: composition state and every local mutation
//! - [`SyncBoundary`]: write-backs layered over a [`SyncBackend`]
//! - [`Config`]: application configuration management

pub mod cluster;
pub mod error;
pub mod events;
pub mod geo;
pub mod gesture;
pub mod job;
pub mod route;
pub mod session;
pub mod storage;
pub mod sync;

pub use cluster::{Cluster, ClusterManager, ClusterState, Completion, Confirmation};
pub use error::{ConfigError, CoreError, LifecycleError, ValidationError};
pub use events::Event;
pub use geo::{distance, within_circle, Coordinate};
pub use gesture::{Circle, GestureMachine, GesturePhase};
pub use job::{Job, JobStatus};
pub use route::{Route, RouteDraft, RouteMetadata};
pub use session::Session;
pub use storage::{Config, SessionStore};
pub use sync::{
    HttpSyncClient, MemoryBackend, Outbox, RetryReport, SyncBackend, SyncBoundary, SyncError,
    SyncStatus,
};
