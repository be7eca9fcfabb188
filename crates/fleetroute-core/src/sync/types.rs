//! Core types for the sync boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cluster::{Completion, Confirmation};
use crate::job::Job;
use crate::route::RouteDraft;

/// One grouped job as written back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedJob {
    pub id: String,
    pub priority: u32,
}

/// Cluster confirmation write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPayload {
    pub group_id: String,
    pub jobs: Vec<RankedJob>,
}

impl From<&Confirmation> for ConfirmationPayload {
    fn from(confirmation: &Confirmation) -> Self {
        Self {
            group_id: confirmation.group_id.clone(),
            jobs: confirmation
                .grouped
                .iter()
                .map(|job| RankedJob {
                    id: job.id.clone(),
                    priority: job.priority.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Completion write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionPayload {
    pub completed_job_ids: Vec<String>,
}

impl From<&Completion> for CompletionPayload {
    fn from(completion: &Completion) -> Self {
        Self {
            completed_job_ids: completion.completed_ids.clone(),
        }
    }
}

/// Work handed to the external optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    /// Newly grouped jobs, empty after a completion
    pub grouped: Vec<Job>,
    pub remaining: Vec<Job>,
}

/// A single persistence call, kept so a failed one can be retried by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SyncOperation {
    ConfirmCluster(ConfirmationPayload),
    CompleteJobs(CompletionPayload),
    SaveRoute(RouteDraft),
    Optimize(OptimizationRequest),
}

impl SyncOperation {
    pub fn name(&self) -> &'static str {
        match self {
            SyncOperation::ConfirmCluster(_) => "confirm_cluster",
            SyncOperation::CompleteJobs(_) => "complete_jobs",
            SyncOperation::SaveRoute(_) => "save_route",
            SyncOperation::Optimize(_) => "optimize",
        }
    }
}

/// Current sync status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Last successful job refresh.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Failed operations waiting for a manual retry.
    pub pending_count: usize,
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_payload_keeps_rank_order() {
        let mut a = Job::new("a", "A");
        a.group("g1", 1).unwrap();
        let mut b = Job::new("b", "B");
        b.group("g1", 2).unwrap();
        let confirmation = Confirmation {
            group_id: "g1".into(),
            grouped: vec![a, b],
            remaining: vec![],
        };
        let payload = ConfirmationPayload::from(&confirmation);
        assert_eq!(payload.group_id, "g1");
        assert_eq!(
            payload.jobs,
            vec![
                RankedJob { id: "a".into(), priority: 1 },
                RankedJob { id: "b".into(), priority: 2 },
            ]
        );
    }

    #[test]
    fn operation_serializes_with_kind_tag() {
        let op = SyncOperation::CompleteJobs(CompletionPayload {
            completed_job_ids: vec!["x".into()],
        });
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "complete_jobs");
        assert_eq!(json["payload"]["completed_job_ids"][0], "x");
        assert_eq!(op.name(), "complete_jobs");
    }
}
