//! `SyncTransport` (§4.G): the three HTTP phases a sync run drives —
//! `start`/`chunk`/`commit` — behind a trait seam, with one concrete
//! `reqwest`-based implementation following `r2e-security`'s JWKS client
//! idiom (bearer auth, JSON bodies, typed response structs).

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thand_core::SystemChunk;

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send + 'a>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSession {
    pub workflow_id: String,
    pub run_id: String,
}

/// The `start`/`chunk`/`commit` HTTP surface an upstream login server
/// exposes (§6 "Synchronization HTTP surface").
pub trait SyncTransport: Send + Sync {
    fn start(&self, agent_id: &str) -> BoxFut<'_, SyncSession>;
    fn chunk<'a>(&'a self, agent_id: &'a str, session: &'a SyncSession, chunk: &'a SystemChunk) -> BoxFut<'a, ()>;
    fn commit<'a>(&'a self, agent_id: &'a str, session: &'a SyncSession) -> BoxFut<'a, ()>;
}

pub struct HttpSyncTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpSyncTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), api_key: api_key.into() }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

impl SyncTransport for HttpSyncTransport {
    fn start(&self, agent_id: &str) -> BoxFut<'_, SyncSession> {
        let agent_id = agent_id.to_string();
        Box::pin(async move {
            let resp = self
                .client
                .post(self.endpoint(&format!("/providers/{agent_id}/sync/start")))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| SyncError::Rpc(e.to_string()))?;
            classify_status(&resp)?;
            resp.json::<SyncSession>().await.map_err(|e| SyncError::Rpc(e.to_string()))
        })
    }

    fn chunk<'a>(&'a self, agent_id: &'a str, session: &'a SyncSession, chunk: &'a SystemChunk) -> BoxFut<'a, ()> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.endpoint(&format!("/providers/{agent_id}/sync/{}/chunk", session.workflow_id)))
                .bearer_auth(&self.api_key)
                .json(chunk)
                .send()
                .await
                .map_err(|e| SyncError::Rpc(e.to_string()))?;
            classify_status(&resp)
        })
    }

    fn commit<'a>(&'a self, agent_id: &'a str, session: &'a SyncSession) -> BoxFut<'a, ()> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.endpoint(&format!("/providers/{agent_id}/sync/{}/commit", session.workflow_id)))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| SyncError::Rpc(e.to_string()))?;
            classify_status(&resp)
        })
    }
}

/// 2xx is success; 429 and 5xx are retryable RPC failures; any other 4xx is
/// non-retryable (§7 recovery column: "Non-retryable errors terminate the
/// workflow").
fn classify_status(resp: &reqwest::Response) -> Result<(), SyncError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else if status.as_u16() == 429 || status.is_server_error() {
        Err(SyncError::Rpc(format!("upstream returned {status}")))
    } else {
        Err(SyncError::NonRetryable(format!("upstream returned {status}")))
    }
}
