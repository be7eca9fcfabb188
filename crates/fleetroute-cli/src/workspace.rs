//! Per-invocation state shared by the commands.
//!
//! Each CLI call loads the config and the saved session, runs one command,
//! and writes the session back.

use std::error::Error;
use std::time::Duration;

use fleetroute_core::job::Job;
use fleetroute_core::route::RouteDraft;
use fleetroute_core::sync::{
    CompletionPayload, ConfirmationPayload, HttpSyncClient, MemoryBackend, OptimizationRequest,
    Outbox, SyncBackend, SyncBoundary, SyncError,
};
use fleetroute_core::{Config, Session, SessionStore};

pub type CmdResult<T = ()> = Result<T, Box<dyn Error>>;

pub struct Workspace {
    pub config: Config,
    pub session: Session,
    store: SessionStore,
}

impl Workspace {
    pub fn open() -> CmdResult<Self> {
        let config = Config::load()?;
        let store = SessionStore::open()?;
        let session = store.load(&config)?;
        Ok(Self {
            config,
            session,
            store,
        })
    }

    /// Flush queued events to the log and write the session back.
    pub fn save(&mut self) -> CmdResult {
        for event in self.session.drain_events() {
            let json = serde_json::to_string(&event)?;
            tracing::debug!(event = %json, "session event");
        }
        self.store.save(&self.session)?;
        Ok(())
    }

    /// Wire a sync boundary to the configured backend.
    ///
    /// Offline mode stands in a memory store seeded with the session's jobs.
    pub fn boundary(&self) -> CmdResult<SyncBoundary<Backend>> {
        let backend = if self.config.api.offline {
            tracing::debug!("offline mode, using in-memory job store");
            Backend::Memory(MemoryBackend::new(self.session.jobs().to_vec()))
        } else {
            Backend::Http(HttpSyncClient::new(
                &self.config.api.base_url,
                Duration::from_secs(self.config.api.timeout_secs),
            )?)
        };
        Ok(SyncBoundary::new(backend, Outbox::open()?))
    }
}

/// Single-threaded runtime for the one async call a command makes.
pub fn runtime() -> CmdResult<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Backend chosen at runtime from `api.offline`.
pub enum Backend {
    Http(HttpSyncClient),
    Memory(MemoryBackend),
}

impl SyncBackend for Backend {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SyncError> {
        match self {
            Backend::Http(b) => b.fetch_jobs().await,
            Backend::Memory(b) => b.fetch_jobs().await,
        }
    }

    async fn push_confirmation(&self, payload: &ConfirmationPayload) -> Result<(), SyncError> {
        match self {
            Backend::Http(b) => b.push_confirmation(payload).await,
            Backend::Memory(b) => b.push_confirmation(payload).await,
        }
    }

    async fn push_completion(&self, payload: &CompletionPayload) -> Result<(), SyncError> {
        match self {
            Backend::Http(b) => b.push_completion(payload).await,
            Backend::Memory(b) => b.push_completion(payload).await,
        }
    }

    async fn save_route(&self, draft: &RouteDraft) -> Result<(), SyncError> {
        match self {
            Backend::Http(b) => b.save_route(draft).await,
            Backend::Memory(b) => b.save_route(draft).await,
        }
    }

    async fn request_optimization(&self, request: &OptimizationRequest) -> Result<(), SyncError> {
        match self {
            Backend::Http(b) => b.request_optimization(request).await,
            Backend::Memory(b) => b.request_optimization(request).await,
        }
    }
}
