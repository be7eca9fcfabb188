//! JSON-over-HTTP client for the job store, persistence API and optimizer.

use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::job::Job;
use crate::route::RouteDraft;
use crate::sync::backend::SyncBackend;
use crate::sync::types::{CompletionPayload, ConfirmationPayload, OptimizationRequest, SyncError};

pub struct HttpSyncClient {
    base_url: Url,
    http_client: reqwest::Client,
}

impl HttpSyncClient {
    /// Client rooted at `base_url`, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        // Url::join drops the last segment unless the base ends with '/'.
        let mut base = base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, SyncError> {
        Ok(self.base_url.join(path)?)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<(), SyncError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");
        let response = self.http_client.post(url).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `SyncError::Api`.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(SyncError::Api {
        status: status.as_u16(),
        message,
    })
}

impl SyncBackend for HttpSyncClient {
    async fn fetch_jobs(&self) -> Result<Vec<Job>, SyncError> {
        let url = self.endpoint("jobs")?;
        tracing::debug!(%url, "GET");
        let response = self.http_client.get(url).send().await?;
        let jobs = check_status(response).await?.json::<Vec<Job>>().await?;
        Ok(jobs)
    }

    async fn push_confirmation(&self, payload: &ConfirmationPayload) -> Result<(), SyncError> {
        self.post("clusters/confirm", payload).await
    }

    async fn push_completion(&self, payload: &CompletionPayload) -> Result<(), SyncError> {
        self.post("clusters/complete", payload).await
    }

    async fn save_route(&self, draft: &RouteDraft) -> Result<(), SyncError> {
        self.post("routes", draft).await
    }

    async fn request_optimization(&self, request: &OptimizationRequest) -> Result<(), SyncError> {
        self.post("optimize", request).await
    }
}
