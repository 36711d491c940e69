//! Error kinds for provider lookup and instantiation (§7).

#[derive(Debug)]
pub enum ProviderError {
    /// A prefixed identity or inherits-item named an unknown provider.
    ProviderNotFound(String),
    /// The adapter's `Initialize` call failed.
    InitFailed { provider: String, detail: String },
    /// An adapter RPC failed (lookup, role fetch, synchronize, ...).
    Rpc(String),
    /// No engine is registered under this name.
    EngineNotFound(String),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::ProviderNotFound(name) => write!(f, "provider not found: {name}"),
            ProviderError::InitFailed { provider, detail } => {
                write!(f, "provider '{provider}' failed to initialize: {detail}")
            }
            ProviderError::Rpc(msg) => write!(f, "provider rpc failed: {msg}"),
            ProviderError::EngineNotFound(name) => write!(f, "no engine registered: {name}"),
        }
    }
}

impl std::error::Error for ProviderError {}
