use std::future::Future;

use crate::job::Job;
use crate::route::RouteDraft;
use crate::sync::types::{
    CompletionPayload, ConfirmationPayload, OptimizationRequest, SyncError, SyncOperation,
};

/// External job store, persistence API and optimizer, seen from the engine.
///
/// Every call is single-shot: it either succeeds or reports why it did not.
/// Nothing here retries.
pub trait SyncBackend {
    /// Authoritative job list.
    fn fetch_jobs(&self) -> impl Future<Output = Result<Vec<Job>, SyncError>> + Send;

    fn push_confirmation(
        &self,
        payload: &ConfirmationPayload,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    fn push_completion(
        &self,
        payload: &CompletionPayload,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    fn save_route(&self, draft: &RouteDraft) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Hand grouped/remaining jobs to the optimizer. Its output is not consumed.
    fn request_optimization(
        &self,
        request: &OptimizationRequest,
    ) -> impl Future<Output = Result<(), SyncError>> + Send;

    /// Dispatch a recorded operation to the matching call.
    fn execute(&self, operation: &SyncOperation) -> impl Future<Output = Result<(), SyncError>> + Send
    where
        Self: Sync,
    {
        async move {
            match operation {
                SyncOperation::ConfirmCluster(p) => self.push_confirmation(p).await,
                SyncOperation::CompleteJobs(p) => self.push_completion(p).await,
                SyncOperation::SaveRoute(d) => self.save_route(d).await,
                SyncOperation::Optimize(r) => self.request_optimization(r).await,
            }
        }
    }
}
