//! In-process job store.
//!
//! Backs offline CLI sessions and tests. Write-backs are applied to the held
//! jobs the way the remote store would apply them, so a refresh after a
//! successful push sees the new statuses.

use std::sync::{Mutex, MutexGuard};

use crate::job::{Job, JobStatus};
use crate::route::RouteDraft;
use crate::sync::backend::SyncBackend;
use crate::sync::types::{
    CompletionPayload, ConfirmationPayload, OptimizationRequest, SyncError,
};

#[derive(Debug, Default)]
struct MemoryState {
    jobs: Vec<Job>,
    routes: Vec<RouteDraft>,
    optimizations: Vec<OptimizationRequest>,
    /// Every write call received, successful or not, in order.
    calls: Vec<String>,
    fail_writes: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                jobs,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panicked holder cannot leave the plain-data state half-written.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every subsequent write fail with `message`; `None` restores writes.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.lock().fail_writes = message.map(str::to_string);
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.lock().jobs.clone()
    }

    pub fn routes(&self) -> Vec<RouteDraft> {
        self.lock().routes.clone()
    }

    pub fn optimizations(&self) -> Vec<OptimizationRequest> {
        self.lock().optimizations.clone()
    }

    /// Names of write calls received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn write(
        &self,
        operation: &str,
        apply: impl FnOnce(&mut MemoryState),
    ) -> Result<(), SyncError> {
        let mut state = self.lock();
        state.calls.push(operation.to_string());
        if let Some(message) = &state.fail_writes {
            return Err(SyncError::Unavailable(message.clone()));
        }
        apply(&mut *state);
        Ok(())
    }
}

impl SyncBackend for MemoryBackend {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SyncError> {
        Ok(self.jobs())
    }

    async fn push_confirmation(&self, payload: &ConfirmationPayload) -> Result<(), SyncError> {
        self.write("confirm_cluster", |state| {
            for ranked in &payload.jobs {
                if let Some(job) = state.jobs.iter_mut().find(|j| j.id == ranked.id) {
                    job.status = JobStatus::Grouped;
                    job.group_id = Some(payload.group_id.clone());
                    job.priority = Some(ranked.priority);
                }
            }
        })
    }

    async fn push_completion(&self, payload: &CompletionPayload) -> Result<(), SyncError> {
        self.write("complete_jobs", |state| {
            for id in &payload.completed_job_ids {
                if let Some(job) = state.jobs.iter_mut().find(|j| &j.id == id) {
                    job.status = JobStatus::Completed;
                    job.group_id = None;
                }
            }
        })
    }

    async fn save_route(&self, draft: &RouteDraft) -> Result<(), SyncError> {
        self.write("save_route", |state| state.routes.push(draft.clone()))
    }

    async fn request_optimization(&self, request: &OptimizationRequest) -> Result<(), SyncError> {
        self.write("optimize", |state| state.optimizations.push(request.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::{RankedJob, SyncOperation};

    #[tokio::test]
    async fn confirmation_is_applied_to_store() {
        let backend = MemoryBackend::new(vec![Job::new("a", "A"), Job::new("b", "B")]);
        backend
            .push_confirmation(&ConfirmationPayload {
                group_id: "g".into(),
                jobs: vec![RankedJob {
                    id: "b".into(),
                    priority: 1,
                }],
            })
            .await
            .unwrap();

        let jobs = backend.fetch_jobs().await.unwrap();
        assert_eq!(jobs[0].status, JobStatus::Pending);
        assert_eq!(jobs[1].status, JobStatus::Grouped);
        assert_eq!(jobs[1].priority, Some(1));
        assert_eq!(backend.calls(), vec!["confirm_cluster"]);
    }

    #[tokio::test]
    async fn injected_failure_leaves_store_untouched() {
        let backend = MemoryBackend::new(vec![Job::new("a", "A")]);
        backend.fail_writes(Some("offline"));
        let err = backend
            .push_completion(&CompletionPayload {
                completed_job_ids: vec!["a".into()],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Unavailable(ref m) if m == "offline"));
        assert_eq!(backend.jobs()[0].status, JobStatus::Pending);

        backend.fail_writes(None);
        backend
            .execute(&SyncOperation::CompleteJobs(CompletionPayload {
                completed_job_ids: vec!["a".into()],
            }))
            .await
            .unwrap();
        assert_eq!(backend.jobs()[0].status, JobStatus::Completed);
        assert_eq!(backend.calls().len(), 2);
    }
}
