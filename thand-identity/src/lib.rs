//! Identity Aggregator (§4.E): single-identity resolution and filtered
//! multi-identity listing across provider adapters.

pub mod fanout;
pub mod list;

pub use fanout::get_identity;
pub use list::{get_identities_with_filter, IdentityKind};
pub use thand_providers::ProviderError as IdentityError;
