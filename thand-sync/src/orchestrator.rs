//! The three-phase sync run (§4.G): `start`, then loop
//! `GetLocalConfigurationChunk` + `chunk` while a cursor remains, then
//! `commit`. Each phase call is retried per [`crate::backoff`]; a
//! non-retryable error aborts the whole run immediately.

use crate::backoff::next_delay;
use crate::chunk::{get_local_configuration_chunk, ConfigurationSnapshot};
use crate::error::SyncError;
use crate::transport::SyncTransport;
use std::future::Future;

/// Runs one full synchronization of `snapshot` for `agent_id` against
/// `transport`.
pub async fn run_sync(
    transport: &dyn SyncTransport,
    agent_id: &str,
    snapshot: &ConfigurationSnapshot,
) -> Result<(), SyncError> {
    let session = retrying(|| transport.start(agent_id)).await?;

    let mut cursor = None;
    loop {
        let (chunk, next_cursor) = get_local_configuration_chunk(snapshot, cursor);
        retrying(|| transport.chunk(agent_id, &session, &chunk)).await?;
        match next_cursor {
            Some(c) => cursor = Some(c),
            None => break,
        }
    }

    retrying(|| transport.commit(agent_id, &session)).await
}

/// Retries `op` per the backoff schedule; stops immediately on a
/// non-retryable error, and on the schedule's exhaustion returns the last
/// error observed.
async fn retrying<F, Fut, T>(mut op: F) -> Result<T, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SyncError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => match next_delay(attempt) {
                Some(delay) => {
                    tracing::warn!(attempt, error = %e, "sync activity failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SyncSession;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use thand_core::SystemChunk;

    type BoxFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send + 'a>>;

    struct CountingTransport {
        start_calls: AtomicUsize,
        chunk_calls: AtomicUsize,
        commit_calls: AtomicUsize,
        fail_chunks_until: usize,
        chunks_seen: Mutex<Vec<usize>>,
    }

    impl SyncTransport for CountingTransport {
        fn start(&self, _agent_id: &str) -> BoxFut<'_, SyncSession> {
            self.start_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(SyncSession { workflow_id: "wf1".into(), run_id: "run1".into() }) })
        }

        fn chunk<'a>(&'a self, _agent_id: &'a str, _session: &'a SyncSession, chunk: &'a SystemChunk) -> BoxFut<'a, ()> {
            let n = self.chunk_calls.fetch_add(1, Ordering::SeqCst);
            self.chunks_seen.lock().unwrap().push(chunk.roles.len());
            Box::pin(async move {
                if n < self.fail_chunks_until {
                    Err(SyncError::Rpc("transient".into()))
                } else {
                    Ok(())
                }
            })
        }

        fn commit<'a>(&'a self, _agent_id: &'a str, _session: &'a SyncSession) -> BoxFut<'a, ()> {
            self.commit_calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn full_run_calls_start_chunk_commit_in_order() {
        let snapshot = ConfigurationSnapshot::default();
        let transport = CountingTransport {
            start_calls: AtomicUsize::new(0),
            chunk_calls: AtomicUsize::new(0),
            commit_calls: AtomicUsize::new(0),
            fail_chunks_until: 0,
            chunks_seen: Mutex::new(Vec::new()),
        };

        run_sync(&transport, "agent-1", &snapshot).await.unwrap();

        assert_eq!(transport.start_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.chunk_calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.commit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_chunk_failure_is_retried() {
        let snapshot = ConfigurationSnapshot::default();
        let transport = CountingTransport {
            start_calls: AtomicUsize::new(0),
            chunk_calls: AtomicUsize::new(0),
            commit_calls: AtomicUsize::new(0),
            fail_chunks_until: 2,
            chunks_seen: Mutex::new(Vec::new()),
        };

        run_sync(&transport, "agent-1", &snapshot).await.unwrap();
        assert_eq!(transport.chunk_calls.load(Ordering::SeqCst), 3);
        assert_eq!(transport.commit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_retryable_error_aborts_immediately() {
        struct FailingTransport;
        impl SyncTransport for FailingTransport {
            fn start(&self, _agent_id: &str) -> BoxFut<'_, SyncSession> {
                Box::pin(async { Err(SyncError::NonRetryable("unauthorized".into())) })
            }
            fn chunk<'a>(&'a self, _a: &'a str, _s: &'a SyncSession, _c: &'a SystemChunk) -> BoxFut<'a, ()> {
                Box::pin(async { unreachable!("chunk should never be called") })
            }
            fn commit<'a>(&'a self, _a: &'a str, _s: &'a SyncSession) -> BoxFut<'a, ()> {
                Box::pin(async { unreachable!("commit should never be called") })
            }
        }

        let snapshot = ConfigurationSnapshot::default();
        let err = run_sync(&FailingTransport, "agent-1", &snapshot).await.unwrap_err();
        assert!(matches!(err, SyncError::NonRetryable(_)));
    }
}
