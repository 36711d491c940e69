//! `SyncError` (§7 `UpstreamRpcKind`): errors raised by sync activities.

#[derive(Debug)]
pub enum SyncError {
    /// An HTTP phase call (`start`/`chunk`/`commit`) failed transiently —
    /// eligible for backoff retry.
    Rpc(String),
    /// The upstream rejected the request outright (4xx other than 429);
    /// retrying would not help.
    NonRetryable(String),
}

impl SyncError {
    /// Whether this error's activity should be retried per the backoff
    /// policy in [`crate::backoff`] (§7 recovery column).
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Rpc(_))
    }
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Rpc(msg) => write!(f, "sync rpc failed: {msg}"),
            SyncError::NonRetryable(msg) => write!(f, "sync failed (non-retryable): {msg}"),
        }
    }
}

impl std::error::Error for SyncError {}
