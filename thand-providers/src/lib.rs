//! Provider Registry & Adapter Contract (§4.D).

pub mod adapter;
pub mod error;
pub mod registry;
pub mod remote;

pub use adapter::{Capability, ProviderAdapter};
pub use error::ProviderError;
pub use registry::{instantiate_all, ActiveProvider, EngineConstructor, EngineRegistry, ProviderSet};

#[cfg(any(test, feature = "test-util"))]
pub use adapter::test_support;
