//! Thand — a just-in-time privileged access broker core.
//!
//! This facade crate re-exports the per-concern Thand sub-crates through a
//! single dependency with feature flags, the same shape `r2e`'s facade uses
//! over its own sub-crates.
//!
//! ```ignore
//! use thand::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature         | Default | Crate                  |
//! |-----------------|---------|------------------------|
//! | `identity`      | **yes** | `thand-identity`       |
//! | `config`        | **yes** | `thand-config`         |
//! | `sync`          | **yes** | `thand-sync`           |
//! | `observability` | **yes** | `thand-observability`  |
//! | `remote-proxy`  | no      | `thand-providers/remote-proxy` |
//! | `loader-http`   | no      | `thand-core/loader-http` |
//! | `full`          | no      | All of the above       |

pub extern crate thand_core;
pub extern crate thand_providers;
pub extern crate thand_roles;

pub use thand_core::*;

#[cfg(feature = "identity")]
pub use thand_identity;

#[cfg(feature = "config")]
pub use thand_config;

#[cfg(feature = "sync")]
pub use thand_sync;

#[cfg(feature = "observability")]
pub use thand_observability;

/// Unified prelude — import everything with `use thand::prelude::*`.
pub mod prelude {
    pub use thand_core::{
        CoreError, CursorSection, EventFilter, Identity, LogEntry, LogLevel, LogRingBuffer, Principal,
        Provider, Role, RunMode, SystemChunk,
    };
    pub use thand_providers::{Capability, ProviderAdapter, ProviderError, ProviderSet};
    pub use thand_roles::{CompositeRole, RoleError, RoleLookup};

    #[cfg(feature = "identity")]
    pub use thand_identity::{IdentityKind, IdentityError};

    #[cfg(feature = "config")]
    pub use thand_config::ConfigRoot;

    #[cfg(feature = "sync")]
    pub use thand_sync::{SyncError, SyncTransport};

    #[cfg(feature = "observability")]
    pub use thand_observability::LoggingConfig;
}
