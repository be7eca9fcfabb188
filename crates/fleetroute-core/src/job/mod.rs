//! Job model and lifecycle.
//!
//! Only the fields the engine reasons about are typed. Everything else the
//! job store sends along rides in [`Job::extra`] untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LifecycleError;
use crate::geo::Coordinate;

/// Duration assumed for a job that carries none, in minutes.
pub const DEFAULT_JOB_MINUTES: u32 = 30;

/// Job status enumeration.
///
/// ```text
///   PENDING ───────> GROUPED ───────> COMPLETED
///      (lasso + confirm)   (complete grouped)
/// ```
///
/// Valid transitions:
/// - PENDING → GROUPED (cluster confirmed)
/// - GROUPED → COMPLETED (grouped jobs completed)
///
/// Nothing moves backward; COMPLETED is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Unassigned, eligible for lasso selection
    #[default]
    Pending,
    /// Member of a confirmed cluster
    Grouped,
    /// Done (terminal state)
    Completed,
}

impl JobStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &JobStatus) -> bool {
        match self {
            JobStatus::Pending => matches!(to, JobStatus::Grouped),
            JobStatus::Grouped => matches!(to, JobStatus::Completed),
            JobStatus::Completed => false,
        }
    }

    /// Get valid next states for this state.
    pub fn valid_transitions(&self) -> &[JobStatus] {
        match self {
            JobStatus::Pending => &[JobStatus::Grouped],
            JobStatus::Grouped => &[JobStatus::Completed],
            JobStatus::Completed => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Grouped => "grouped",
            JobStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(JobStatus::Pending),
            "grouped" => Ok(JobStatus::Grouped),
            "completed" => Ok(JobStatus::Completed),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// A unit of delivery work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// Stable identifier from the job store
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Display address
    #[serde(default)]
    pub address: Option<String>,
    /// Geographic location; jobs without one never match a lasso
    #[serde(default)]
    pub location: Option<Coordinate>,
    /// 1-based rank within the owning group or route
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub status: JobStatus,
    /// Owning cluster, present iff status is `grouped`
    #[serde(default)]
    pub group_id: Option<String>,
    /// Estimated on-site duration in minutes
    #[serde(default)]
    pub duration_min: Option<u32>,
    /// Opaque pass-through payload
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

impl Job {
    /// New pending job with only an id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            address: None,
            location: None,
            priority: None,
            status: JobStatus::Pending,
            group_id: None,
            duration_min: None,
            extra: serde_json::Value::Null,
        }
    }

    pub fn with_location(mut self, location: Coordinate) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_min = Some(minutes);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == JobStatus::Pending
    }

    /// Duration used for route estimates.
    pub fn duration_or(&self, default_min: u32) -> u32 {
        self.duration_min.unwrap_or(default_min)
    }

    /// Move to a new state. Returns error if the transition is invalid.
    fn transition_to(&mut self, to: JobStatus) -> Result<(), LifecycleError> {
        if !self.status.can_transition_to(&to) {
            return Err(LifecycleError::InvalidTransition {
                job_id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// PENDING → GROUPED with a fresh priority and group reference.
    pub fn group(&mut self, group_id: &str, priority: u32) -> Result<(), LifecycleError> {
        self.transition_to(JobStatus::Grouped)?;
        self.group_id = Some(group_id.to_string());
        self.priority = Some(priority);
        Ok(())
    }

    /// GROUPED → COMPLETED. Priority is kept as the last known rank.
    pub fn complete(&mut self) -> Result<(), LifecycleError> {
        self.transition_to(JobStatus::Completed)?;
        self.group_id = None;
        Ok(())
    }
}
