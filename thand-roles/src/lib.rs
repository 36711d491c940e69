//! Role Composer (§4.C): recursive inheritance-DAG resolution, provider
//! filtering, scope checking, and allow/deny merge semantics.

pub mod compose;
pub mod error;
pub mod filter;
pub mod lookup;
pub mod merge;
pub mod scope;

pub use compose::{get_composite_role_by_name, CompositeRole};
pub use error::RoleError;
pub use filter::{filter_by_provider, InheritTarget};
pub use lookup::RoleLookup;
pub use merge::merge_allow_deny;
pub use scope::is_role_applicable_to_identity;
