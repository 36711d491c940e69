//! Config Root & Merge (§4.H): canonical definitions maps, parallel reload,
//! and JSON merge-patch application.

pub mod document;
pub mod patch;
pub mod root;

pub use document::{extract_providers, extract_roles, extract_workflows};
pub use patch::apply_merge_patch;
pub use root::ConfigRoot;
