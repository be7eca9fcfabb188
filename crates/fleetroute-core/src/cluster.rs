//! Circle-group bookkeeping.
//!
//! A cluster is the set of pending jobs captured by one committed lasso.
//! Geometry and membership are frozen at creation; confirming it is what
//! actually moves the member jobs into the `grouped` state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LifecycleError;
use crate::gesture::Circle;
use crate::job::{Job, JobStatus};

/// Fallback color tags, cycled by cluster count.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#ef4444", "#3b82f6", "#22c55e", "#f59e0b", "#a855f7", "#ec4899", "#14b8a6", "#f97316",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterState {
    Created,
    Confirmed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Group identifier written onto member jobs
    pub id: String,
    /// Display number, 1-based within a session
    pub number: u32,
    pub circle: Circle,
    pub color: String,
    /// Member job ids in source order
    pub member_ids: Vec<String>,
    pub state: ClusterState,
    pub created_at: DateTime<Utc>,
}

/// Result of confirming a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    pub group_id: String,
    /// Member jobs after the transition, in priority order
    pub grouped: Vec<Job>,
    /// Jobs still pending afterwards
    pub remaining: Vec<Job>,
}

/// Result of completing grouped jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub completed_ids: Vec<String>,
    /// Jobs still pending, for re-optimization
    pub remaining: Vec<Job>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterManager {
    clusters: Vec<Cluster>,
    palette: Vec<String>,
}

impl ClusterManager {
    pub fn new(palette: Vec<String>) -> Self {
        Self {
            clusters: Vec::new(),
            palette,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn by_number(&self, number: u32) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.number == number)
    }

    fn next_number(&self) -> u32 {
        self.clusters.iter().map(|c| c.number).max().unwrap_or(0) + 1
    }

    fn next_color(&self) -> String {
        let palette_len = if self.palette.is_empty() {
            DEFAULT_PALETTE.len()
        } else {
            self.palette.len()
        };
        let idx = self.clusters.len() % palette_len;
        self.palette
            .get(idx)
            .cloned()
            .unwrap_or_else(|| DEFAULT_PALETTE[idx].to_string())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Existing clusters keep their colors.
    pub fn set_palette(&mut self, palette: Vec<String>) {
        self.palette = palette;
    }

    /// True if an unconfirmed cluster already holds `job_id`.
    fn is_claimed(&self, job_id: &str) -> bool {
        self.clusters
            .iter()
            .filter(|c| c.state == ClusterState::Created)
            .any(|c| c.member_ids.iter().any(|id| id == job_id))
    }

    /// Capture the pending, located jobs inside `circle`.
    ///
    /// Jobs already held by another unconfirmed cluster are left out, so a
    /// job belongs to at most one cluster. Returns `None` without touching
    /// any state when nothing qualifies.
    pub fn create_cluster(&mut self, circle: Circle, jobs: &[Job]) -> Option<Cluster> {
        let member_ids: Vec<String> = jobs
            .iter()
            .filter(|job| job.is_pending())
            .filter(|job| !self.is_claimed(&job.id))
            .filter(|job| job.location.is_some_and(|loc| circle.contains(loc)))
            .map(|job| job.id.clone())
            .collect();

        if member_ids.is_empty() {
            tracing::debug!(radius_m = circle.radius_m, "lasso captured no pending jobs");
            return None;
        }

        let cluster = Cluster {
            id: Uuid::new_v4().to_string(),
            number: self.next_number(),
            circle,
            color: self.next_color(),
            member_ids,
            state: ClusterState::Created,
            created_at: Utc::now(),
        };
        tracing::debug!(
            number = cluster.number,
            members = cluster.member_ids.len(),
            "cluster created"
        );
        self.clusters.push(cluster.clone());
        Some(cluster)
    }

    /// Move the cluster's members into `grouped` with priorities 1..N.
    ///
    /// Members that are no longer pending, or no longer present in `jobs`,
    /// are skipped and the rest are numbered densely. Returns `Ok(None)` if
    /// the cluster was already confirmed. A cluster left with no member to
    /// group is dropped and also yields `Ok(None)`.
    pub fn confirm_cluster(
        &mut self,
        cluster_id: &str,
        jobs: &mut [Job],
    ) -> Result<Option<Confirmation>, LifecycleError> {
        let idx = self
            .clusters
            .iter()
            .position(|c| c.id == cluster_id)
            .ok_or_else(|| LifecycleError::ClusterNotFound(cluster_id.to_string()))?;
        let cluster = &mut self.clusters[idx];

        if cluster.state != ClusterState::Created {
            return Ok(None);
        }

        let mut grouped_ids = Vec::with_capacity(cluster.member_ids.len());
        for member_id in &cluster.member_ids {
            let Some(job) = jobs.iter_mut().find(|j| &j.id == member_id) else {
                tracing::warn!(job_id = %member_id, "cluster member missing from job store");
                continue;
            };
            if !job.is_pending() {
                tracing::warn!(job_id = %member_id, status = %job.status, "cluster member no longer pending");
                continue;
            }
            let priority = grouped_ids.len() as u32 + 1;
            job.group(&cluster.id, priority)?;
            grouped_ids.push(member_id.clone());
        }

        if grouped_ids.is_empty() {
            tracing::warn!(number = cluster.number, "no member left to group, dropping cluster");
            self.clusters.remove(idx);
            return Ok(None);
        }

        cluster.member_ids = grouped_ids;
        cluster.state = ClusterState::Confirmed;

        let grouped = cluster
            .member_ids
            .iter()
            .filter_map(|id| jobs.iter().find(|j| &j.id == id).cloned())
            .collect();
        let remaining = pending(jobs);

        Ok(Some(Confirmation {
            group_id: cluster.id.clone(),
            grouped,
            remaining,
        }))
    }

    /// Complete every grouped job.
    pub fn complete_grouped(&mut self, jobs: &mut [Job]) -> Result<Completion, LifecycleError> {
        let mut completed_ids = Vec::new();
        for job in jobs.iter_mut().filter(|j| j.status == JobStatus::Grouped) {
            job.complete()?;
            completed_ids.push(job.id.clone());
        }

        for cluster in &mut self.clusters {
            if cluster.state == ClusterState::Confirmed {
                cluster.state = ClusterState::Completed;
            }
        }

        Ok(Completion {
            completed_ids,
            remaining: pending(jobs),
        })
    }

    /// Complete only the grouped members of one cluster.
    pub fn complete_cluster(
        &mut self,
        cluster_id: &str,
        jobs: &mut [Job],
    ) -> Result<Completion, LifecycleError> {
        let cluster = self
            .clusters
            .iter_mut()
            .find(|c| c.id == cluster_id)
            .ok_or_else(|| LifecycleError::ClusterNotFound(cluster_id.to_string()))?;

        let mut completed_ids = Vec::new();
        for job in jobs.iter_mut().filter(|j| {
            j.status == JobStatus::Grouped && j.group_id.as_deref() == Some(cluster_id)
        }) {
            job.complete()?;
            completed_ids.push(job.id.clone());
        }
        if cluster.state == ClusterState::Confirmed {
            cluster.state = ClusterState::Completed;
        }

        Ok(Completion {
            completed_ids,
            remaining: pending(jobs),
        })
    }

    /// Forget all clusters; numbering restarts at 1. Jobs are not touched.
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.clusters.len();
        self.clusters.clear();
        cleared
    }
}

impl Default for ClusterManager {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

fn pending(jobs: &[Job]) -> Vec<Job> {
    jobs.iter().filter(|j| j.is_pending()).cloned().collect()
}
