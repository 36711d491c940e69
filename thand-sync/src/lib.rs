//! Synchronization Orchestrator (§4.G): chunked, cursor-driven configuration
//! sync against an external workflow engine's HTTP surface.

pub mod backoff;
pub mod chunk;
pub mod error;
pub mod orchestrator;
pub mod transport;

pub use chunk::{get_local_configuration_chunk, ConfigurationSnapshot};
pub use error::SyncError;
pub use orchestrator::run_sync;
pub use transport::{HttpSyncTransport, SyncSession, SyncTransport};
