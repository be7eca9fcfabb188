use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gesture::Circle;

/// Every state change in a composition session produces an Event.
/// Front ends render from them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DrawModeChanged {
        enabled: bool,
        at: DateTime<Utc>,
    },
    GestureStarted {
        circle: Circle,
        at: DateTime<Utc>,
    },
    GestureCommitted {
        circle: Circle,
        at: DateTime<Utc>,
    },
    /// Released under the minimum radius, or cancelled.
    GestureDiscarded {
        cancelled: bool,
        radius_m: f64,
        at: DateTime<Utc>,
    },
    ClusterCreated {
        cluster_id: String,
        number: u32,
        color: String,
        member_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    /// Committed lasso contained no pending jobs.
    ClusterEmpty {
        circle: Circle,
        at: DateTime<Utc>,
    },
    ClusterConfirmed {
        cluster_id: String,
        number: u32,
        grouped_ids: Vec<String>,
        remaining: usize,
        at: DateTime<Utc>,
    },
    ClustersCompleted {
        completed_ids: Vec<String>,
        remaining: usize,
        at: DateTime<Utc>,
    },
    ClustersCleared {
        count: usize,
        at: DateTime<Utc>,
    },
    RouteJobAdded {
        job_id: String,
        position: usize,
        at: DateTime<Utc>,
    },
    RouteJobRemoved {
        job_id: String,
        at: DateTime<Utc>,
    },
    RouteJobMoved {
        job_id: String,
        from: usize,
        to: usize,
        at: DateTime<Utc>,
    },
    RouteCleared {
        at: DateTime<Utc>,
    },
    RouteSaved {
        name: String,
        job_count: usize,
        estimated_duration_min: u32,
        at: DateTime<Utc>,
    },
    JobsRefreshed {
        total: usize,
        pending: usize,
        at: DateTime<Utc>,
    },
    /// A persistence call failed; local state was kept.
    SyncFailed {
        operation: String,
        message: String,
        at: DateTime<Utc>,
    },
}
