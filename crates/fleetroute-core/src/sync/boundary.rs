//! Session-level write-backs.
//!
//! [`SyncBoundary`] applies a local mutation to the [`Session`] first and only
//! then talks to the backend. A failed call never rolls the local change
//! back: the operation is recorded in the [`Outbox`] for a manual retry and
//! the session receives a `SyncFailed` event. The optimizer is only asked
//! for a plan once the write it depends on was accepted. After a successful
//! write the job list is refreshed from the backend.

use chrono::{DateTime, Utc};

use crate::cluster::{Completion, Confirmation};
use crate::error::Result;
use crate::route::{RouteDraft, RouteMetadata};
use crate::session::Session;
use crate::sync::backend::SyncBackend;
use crate::sync::outbox::Outbox;
use crate::sync::types::{
    CompletionPayload, ConfirmationPayload, OptimizationRequest, SyncError, SyncOperation,
    SyncStatus,
};

/// Outcome of [`SyncBoundary::retry_pending`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryReport {
    pub succeeded: usize,
    pub failed: usize,
}

pub struct SyncBoundary<B> {
    backend: B,
    outbox: Outbox,
    last_sync_at: Option<DateTime<Utc>>,
}

impl<B: SyncBackend + Sync> SyncBoundary<B> {
    pub fn new(backend: B, outbox: Outbox) -> Self {
        Self {
            backend,
            outbox,
            last_sync_at: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            last_sync_at: self.last_sync_at,
            pending_count: self.outbox.len(),
        }
    }

    /// Replace the session's jobs with the backend's list.
    ///
    /// Clusters and the route keep their own copies and are not touched.
    pub async fn refresh(&mut self, session: &mut Session) -> Result<usize> {
        let jobs = self.backend.fetch_jobs().await?;
        let count = jobs.len();
        session.replace_jobs(jobs);
        self.last_sync_at = Some(Utc::now());
        tracing::info!(count, "job list refreshed");
        Ok(count)
    }

    /// Confirm a cluster locally, write it back and hand the result to the
    /// optimizer.
    ///
    /// Returns `Ok(None)` without any call when the cluster was already
    /// confirmed or had no member left to group. A rejected write-back skips
    /// the optimizer request.
    pub async fn confirm_cluster(
        &mut self,
        session: &mut Session,
        cluster_id: &str,
    ) -> Result<Option<Confirmation>> {
        let Some(confirmation) = session.confirm_cluster(cluster_id)? else {
            return Ok(None);
        };

        self.dispatch(
            session,
            SyncOperation::ConfirmCluster(ConfirmationPayload::from(&confirmation)),
        )
        .await?;
        self.dispatch(
            session,
            SyncOperation::Optimize(OptimizationRequest {
                grouped: confirmation.grouped.clone(),
                remaining: confirmation.remaining.clone(),
            }),
        )
        .await?;
        self.refresh_after_write(session).await;
        Ok(Some(confirmation))
    }

    /// Complete every grouped job and write the result back.
    pub async fn complete_grouped(&mut self, session: &mut Session) -> Result<Completion> {
        let completion = session.complete_grouped()?;
        self.push_completion(session, &completion).await?;
        Ok(completion)
    }

    /// Complete the grouped members of one cluster and write the result back.
    pub async fn complete_cluster(
        &mut self,
        session: &mut Session,
        cluster_id: &str,
    ) -> Result<Completion> {
        let completion = session.complete_cluster(cluster_id)?;
        self.push_completion(session, &completion).await?;
        Ok(completion)
    }

    async fn push_completion(
        &mut self,
        session: &mut Session,
        completion: &Completion,
    ) -> Result<()> {
        if completion.completed_ids.is_empty() {
            tracing::debug!("nothing completed, skipping write-back");
            return Ok(());
        }

        self.dispatch(
            session,
            SyncOperation::CompleteJobs(CompletionPayload::from(completion)),
        )
        .await?;
        self.dispatch(
            session,
            SyncOperation::Optimize(OptimizationRequest {
                grouped: Vec::new(),
                remaining: completion.remaining.clone(),
            }),
        )
        .await?;
        self.refresh_after_write(session).await;
        Ok(())
    }

    /// Validate and save the session's route.
    ///
    /// Validation failures are returned before any backend call is made.
    pub async fn save_route(
        &mut self,
        session: &mut Session,
        metadata: &RouteMetadata,
    ) -> Result<RouteDraft> {
        let draft = session.draft_route(metadata)?;
        self.dispatch(session, SyncOperation::SaveRoute(draft.clone()))
            .await?;
        session.mark_route_saved(&draft);
        tracing::info!(name = %draft.name, jobs = draft.job_ids.len(), "route saved");
        Ok(draft)
    }

    /// Replay every queued operation once, in the order it failed.
    pub async fn retry_pending(&mut self, session: &mut Session) -> Result<RetryReport> {
        let mut report = RetryReport::default();
        for entry in self.outbox.take_all() {
            match self.backend.execute(&entry.operation).await {
                Ok(()) => {
                    tracing::info!(operation = entry.operation.name(), "retry succeeded");
                    if let SyncOperation::SaveRoute(draft) = &entry.operation {
                        session.mark_route_saved(draft);
                    }
                    report.succeeded += 1;
                }
                Err(e) => {
                    tracing::warn!(operation = entry.operation.name(), error = %e, "retry failed");
                    session.record_sync_failure(entry.operation.name(), &e.to_string());
                    self.outbox.requeue(entry, &e);
                    report.failed += 1;
                }
            }
        }
        self.outbox.persist()?;

        if report.succeeded > 0 {
            self.refresh_after_write(session).await;
        }
        Ok(report)
    }

    /// Run one write. A failure is queued for retry and surfaced to the
    /// session before being returned.
    async fn dispatch(
        &mut self,
        session: &mut Session,
        operation: SyncOperation,
    ) -> std::result::Result<(), SyncError> {
        let Err(error) = self.backend.execute(&operation).await else {
            tracing::debug!(operation = operation.name(), "write-back accepted");
            return Ok(());
        };

        tracing::warn!(operation = operation.name(), error = %error, "write-back failed, queued for retry");
        session.record_sync_failure(operation.name(), &error.to_string());
        self.outbox.push(operation, &error);
        if let Err(e) = self.outbox.persist() {
            tracing::error!(error = %e, "failed to persist outbox");
        }
        Err(error)
    }

    async fn refresh_after_write(&mut self, session: &mut Session) {
        if let Err(e) = self.refresh(session).await {
            tracing::warn!(error = %e, "refresh after write failed");
            session.record_sync_failure("fetch_jobs", &e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::geo::Coordinate;
    use crate::job::{Job, JobStatus};
    use crate::sync::memory::MemoryBackend;

    fn cape_town() -> Coordinate {
        Coordinate::new(-33.9249, 18.4241)
    }

    fn jobs() -> Vec<Job> {
        let center = cape_town();
        vec![
            Job::new("a", "A").with_location(center.destination(0.0, 50.0)),
            Job::new("b", "B").with_location(center.destination(90.0, 150.0)),
            Job::new("c", "C").with_location(center.destination(180.0, 300.0)),
        ]
    }

    async fn setup() -> (Session, SyncBoundary<MemoryBackend>, String) {
        let mut session = Session::default();
        let mut boundary = SyncBoundary::new(MemoryBackend::new(jobs()), Outbox::in_memory());
        boundary.refresh(&mut session).await.unwrap();

        session.set_draw_mode(true);
        session.pointer_down(cape_town());
        session.pointer_move(cape_town().destination(0.0, 200.0));
        let cluster = session.pointer_up().unwrap();
        session.drain_events();
        (session, boundary, cluster.id)
    }

    #[tokio::test]
    async fn confirm_pushes_and_refreshes() {
        let (mut session, mut boundary, cluster_id) = setup().await;

        let confirmation = boundary
            .confirm_cluster(&mut session, &cluster_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmation.grouped.len(), 2);
        assert_eq!(boundary.backend().calls(), vec!["confirm_cluster", "optimize"]);

        let optimization = &boundary.backend().optimizations()[0];
        assert_eq!(optimization.grouped.len(), 2);
        assert_eq!(optimization.remaining[0].id, "c");

        // the refreshed list reflects the write-back
        assert_eq!(session.job("a").unwrap().status, JobStatus::Grouped);
        assert_eq!(session.job("b").unwrap().priority, Some(2));
        assert!(boundary.status().last_sync_at.is_some());

        // second confirm is a no-op
        let again = boundary.confirm_cluster(&mut session, &cluster_id).await.unwrap();
        assert!(again.is_none());
        assert_eq!(boundary.backend().calls().len(), 2);
    }

    #[tokio::test]
    async fn failed_confirm_keeps_local_state_and_queues() {
        let (mut session, mut boundary, cluster_id) = setup().await;
        boundary.backend().fail_writes(Some("store offline"));

        let err = boundary
            .confirm_cluster(&mut session, &cluster_id)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("store offline"));

        assert_eq!(session.job("a").unwrap().status, JobStatus::Grouped);
        assert_eq!(boundary.status().pending_count, 1);
        let failures = session
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, Event::SyncFailed { .. }))
            .count();
        assert_eq!(failures, 1);

        boundary.backend().fail_writes(None);
        let report = boundary.retry_pending(&mut session).await.unwrap();
        assert_eq!(report, RetryReport { succeeded: 1, failed: 0 });
        assert!(boundary.outbox().is_empty());
        assert_eq!(boundary.backend().jobs()[0].status, JobStatus::Grouped);
    }

    #[tokio::test]
    async fn retry_requeues_persistent_failures() {
        let (mut session, mut boundary, cluster_id) = setup().await;
        boundary.backend().fail_writes(Some("down"));
        let _ = boundary.confirm_cluster(&mut session, &cluster_id).await;

        let report = boundary.retry_pending(&mut session).await.unwrap();
        assert_eq!(report, RetryReport { succeeded: 0, failed: 1 });
        assert!(boundary.outbox().entries().iter().all(|e| e.attempts == 2));
    }

    #[tokio::test]
    async fn rejected_write_skips_optimizer() {
        let (mut session, mut boundary, cluster_id) = setup().await;
        boundary.backend().fail_writes(Some("store offline"));

        assert!(boundary.confirm_cluster(&mut session, &cluster_id).await.is_err());
        assert_eq!(boundary.backend().calls(), vec!["confirm_cluster"]);
        assert!(boundary.backend().optimizations().is_empty());
        let queued: Vec<_> = boundary
            .outbox()
            .entries()
            .iter()
            .map(|e| e.operation.name())
            .collect();
        assert_eq!(queued, vec!["confirm_cluster"]);
    }

    #[tokio::test]
    async fn confirm_without_groupable_members_makes_no_call() {
        let (mut session, mut boundary, cluster_id) = setup().await;
        // both captured jobs were grouped elsewhere since the lasso
        let mut changed = jobs();
        for job in changed.iter_mut().take(2) {
            job.group("other-cluster", 1).unwrap();
        }
        session.replace_jobs(changed);

        let result = boundary.confirm_cluster(&mut session, &cluster_id).await.unwrap();
        assert!(result.is_none());
        assert!(boundary.backend().calls().is_empty());
        assert!(boundary.outbox().is_empty());
        assert!(session.clusters().get(&cluster_id).is_none());
    }

    #[tokio::test]
    async fn complete_pushes_ids_and_remaining() {
        let (mut session, mut boundary, cluster_id) = setup().await;
        boundary.confirm_cluster(&mut session, &cluster_id).await.unwrap();

        let completion = boundary.complete_grouped(&mut session).await.unwrap();
        assert_eq!(completion.completed_ids, vec!["a", "b"]);

        let optimizations = boundary.backend().optimizations();
        let last = optimizations.last().unwrap();
        assert!(last.grouped.is_empty());
        assert_eq!(last.remaining.len(), 1);
        assert_eq!(session.job("a").unwrap().status, JobStatus::Completed);

        // nothing left to complete: no further calls
        let calls = boundary.backend().calls().len();
        let completion = boundary.complete_grouped(&mut session).await.unwrap();
        assert!(completion.completed_ids.is_empty());
        assert_eq!(boundary.backend().calls().len(), calls);
    }

    #[tokio::test]
    async fn save_with_empty_name_makes_no_call() {
        let (mut session, mut boundary, _) = setup().await;
        session.add_to_route("a").unwrap();

        let err = boundary
            .save_route(&mut session, &RouteMetadata::named("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::CoreError::Validation(_)));
        assert!(boundary.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn save_sends_ordered_draft() {
        let (mut session, mut boundary, _) = setup().await;
        session.add_to_route("a").unwrap();
        session.add_to_route("c").unwrap();
        session.move_in_route(1, 0).unwrap();
        session.assign_driver(Some("driver-7".into()));

        let draft = boundary
            .save_route(&mut session, &RouteMetadata::named("Morning run"))
            .await
            .unwrap();
        assert_eq!(draft.job_ids, vec!["c", "a"]);
        assert_eq!(draft.estimated_duration_min, 60);
        assert_eq!(boundary.backend().routes(), vec![draft]);
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, Event::RouteSaved { .. })));
        // saving does not reset the route
        assert_eq!(session.route().len(), 2);
    }
}
