//! Manually composed routes.
//!
//! A route is an explicit job order built by add / remove / drag-reorder,
//! independent of lasso clustering. Member copies carry their 1-based route
//! position as priority, renumbered after every mutation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::job::{Job, DEFAULT_JOB_MINUTES};

/// Caller-supplied save parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMetadata {
    pub name: String,
    /// Overrides the route's assigned driver when set
    #[serde(default)]
    pub driver_id: Option<String>,
    /// Overrides the route's assigned vehicle when set
    #[serde(default)]
    pub vehicle_id: Option<String>,
}

impl RouteMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Frozen route payload handed to the sync boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDraft {
    pub name: String,
    pub job_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub estimated_duration_min: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    jobs: Vec<Job>,
    #[serde(default)]
    driver_id: Option<String>,
    #[serde(default)]
    vehicle_id: Option<String>,
    default_job_minutes: u32,
}

impl Route {
    pub fn new(default_job_minutes: u32) -> Self {
        Self {
            jobs: Vec::new(),
            driver_id: None,
            vehicle_id: None,
            default_job_minutes,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job_ids(&self) -> Vec<String> {
        self.jobs.iter().map(|j| j.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.jobs.iter().any(|j| j.id == job_id)
    }

    pub fn driver_id(&self) -> Option<&str> {
        self.driver_id.as_deref()
    }

    pub fn vehicle_id(&self) -> Option<&str> {
        self.vehicle_id.as_deref()
    }

    /// Sum of member durations, defaulting per job when absent.
    ///
    /// Saturates at `u32::MAX` rather than wrapping.
    pub fn estimate_duration(&self) -> u32 {
        self.jobs
            .iter()
            .map(|j| j.duration_or(self.default_job_minutes))
            .fold(0u32, |total, minutes| total.saturating_add(minutes))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Append `job` unless its id is already present. Returns true if added.
    pub fn add_job(&mut self, job: Job) -> bool {
        if self.contains(&job.id) {
            return false;
        }
        self.jobs.push(job);
        self.renumber();
        true
    }

    /// Remove by id. Returns true if something was removed.
    pub fn remove_job(&mut self, job_id: &str) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != job_id);
        let removed = self.jobs.len() != before;
        if removed {
            self.renumber();
        }
        removed
    }

    /// Take the job at `from` out and reinsert it at `to`.
    ///
    /// Both indices refer to the current list; `[A,B,C]` with `(0, 2)`
    /// becomes `[B,C,A]`.
    pub fn move_job(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        let len = self.jobs.len();
        if from >= len {
            return Err(ValidationError::out_of_bounds("route", from, len));
        }
        if to >= len {
            return Err(ValidationError::out_of_bounds("route", to, len));
        }
        if from != to {
            let job = self.jobs.remove(from);
            self.jobs.insert(to, job);
            self.renumber();
        }
        Ok(())
    }

    pub fn set_default_job_minutes(&mut self, minutes: u32) {
        self.default_job_minutes = minutes;
    }

    pub fn assign_driver(&mut self, driver_id: Option<String>) {
        self.driver_id = driver_id;
    }

    pub fn assign_vehicle(&mut self, vehicle_id: Option<String>) {
        self.vehicle_id = vehicle_id;
    }

    /// Empty the route and drop assignments.
    pub fn clear(&mut self) {
        self.jobs.clear();
        self.driver_id = None;
        self.vehicle_id = None;
    }

    /// Validate and freeze the route for saving.
    pub fn draft(&self, metadata: &RouteMetadata) -> Result<RouteDraft, ValidationError> {
        let name = metadata.name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "route name must not be empty".into(),
            });
        }
        if self.jobs.is_empty() {
            return Err(ValidationError::EmptyCollection(
                "route needs at least one job".into(),
            ));
        }

        Ok(RouteDraft {
            name: name.to_string(),
            job_ids: self.job_ids(),
            driver_id: metadata.driver_id.clone().or_else(|| self.driver_id.clone()),
            vehicle_id: metadata.vehicle_id.clone().or_else(|| self.vehicle_id.clone()),
            estimated_duration_min: self.estimate_duration(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn renumber(&mut self) {
        for (idx, job) in self.jobs.iter_mut().enumerate() {
            job.priority = Some(idx as u32 + 1);
        }
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_MINUTES)
    }
}
