//! Data model, permission calculus, log ring buffer, source loader, and
//! process configuration for the Thand elevation agent core.
//!
//! See `SPEC_FULL.md` §3–§4 for the behavior this crate implements.

pub mod config;
pub mod error;
pub mod loader;
pub mod log;
pub mod model;
pub mod permissions;

pub use error::CoreError;
pub use log::{EventFilter, LogRingBuffer};
pub use model::*;
