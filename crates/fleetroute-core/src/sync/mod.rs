//! Sync boundary with the external job store, persistence API and optimizer.
//!
//! Every backend call is single-shot and returns a `Result`. Failed
//! write-backs land in the [`Outbox`] and are only replayed on request.

pub mod backend;
pub mod boundary;
pub mod http_client;
pub mod memory;
pub mod outbox;
pub mod types;


pub use backend::SyncBackend;
pub use boundary::{RetryReport, SyncBoundary};
pub use http_client::HttpSyncClient;
pub use memory::MemoryBackend;
pub use outbox::{Outbox, OutboxEntry};
pub use types::{
    CompletionPayload, ConfirmationPayload, OptimizationRequest, RankedJob, SyncError,
    SyncOperation, SyncStatus,
};
