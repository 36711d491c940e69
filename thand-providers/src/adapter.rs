//! Provider adapter contract (§4.D).
//!
//! [`ProviderAdapter`] is dyn-compatible: every call returns
//! `Pin<Box<dyn Future<...> + Send + '_>>` rather than using async-fn-in-trait,
//! so registry entries can be stored as `Arc<dyn ProviderAdapter>` — the same
//! shape as `r2e-openfga::backend::OpenFgaBackend`.

use crate::error::ProviderError;
use std::future::Future;
use std::pin::Pin;
use thand_core::{Identity, ProviderRole};

/// A capability a provider adapter may advertise (§4.D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Identities,
    Rbac,
    Synchronize,
}

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// The capability set a provider adapter implements (§4.D).
///
/// Identity-scoped lookups (`get_role`) carry the requesting identity so the
/// adapter can apply `Provider.role.scopes` gating before dispatching, per
/// §4.D "Provider-level scopes... further gate calls".
pub trait ProviderAdapter: Send + Sync {
    /// One-time setup; called once after construction (§4.D lifecycle).
    fn initialize(&self) -> BoxFut<'_, ()>;

    /// The capabilities this adapter advertises.
    fn capabilities(&self) -> Vec<Capability>;

    /// The provider's bound identifier (name or engine-assigned id).
    fn identifier(&self) -> &str;

    fn get_identity<'a>(&'a self, key: &'a str) -> BoxFut<'a, Option<Identity>>;
    fn list_identities<'a>(&'a self, search: &'a str) -> BoxFut<'a, Vec<Identity>>;

    fn get_role<'a>(&'a self, name: &'a str, identity: &'a Identity) -> BoxFut<'a, Option<ProviderRole>>;
    fn list_roles(&self) -> BoxFut<'_, Vec<ProviderRole>>;

    fn get_permission<'a>(&'a self, name: &'a str) -> BoxFut<'a, Option<String>>;
    fn list_permissions(&self) -> BoxFut<'_, Vec<String>>;
    fn list_resources(&self) -> BoxFut<'_, Vec<String>>;

    /// Best-effort upstream synchronization, launched asynchronously after
    /// `initialize` succeeds (§4.D).
    fn synchronize(&self) -> BoxFut<'_, ()>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_support {
    use super::*;
    use std::sync::Mutex;

    /// A scriptable in-memory adapter used by `thand-roles`/`thand-identity`
    /// unit tests, analogous to `r2e-openfga::backend::MockBackend`.
    pub struct MockAdapter {
        pub name: String,
        pub capabilities: Vec<Capability>,
        pub identities: Mutex<Vec<Identity>>,
        pub roles: Mutex<Vec<ProviderRole>>,
    }

    impl MockAdapter {
        pub fn new(name: &str, capabilities: Vec<Capability>) -> Self {
            Self {
                name: name.to_string(),
                capabilities,
                identities: Mutex::new(Vec::new()),
                roles: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProviderAdapter for MockAdapter {
        fn initialize(&self) -> BoxFut<'_, ()> {
            Box::pin(async { Ok(()) })
        }

        fn capabilities(&self) -> Vec<Capability> {
            self.capabilities.clone()
        }

        fn identifier(&self) -> &str {
            &self.name
        }

        fn get_identity<'a>(&'a self, key: &'a str) -> BoxFut<'a, Option<Identity>> {
            Box::pin(async move {
                Ok(self
                    .identities
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|i| i.id == key)
                    .cloned())
            })
        }

        fn list_identities<'a>(&'a self, search: &'a str) -> BoxFut<'a, Vec<Identity>> {
            Box::pin(async move {
                let all = self.identities.lock().unwrap().clone();
                if search.is_empty() {
                    Ok(all)
                } else {
                    Ok(all.into_iter().filter(|i| i.label.contains(search)).collect())
                }
            })
        }

        fn get_role<'a>(
            &'a self,
            name: &'a str,
            _identity: &'a Identity,
        ) -> BoxFut<'a, Option<ProviderRole>> {
            Box::pin(async move { Ok(self.roles.lock().unwrap().iter().find(|r| r.name == name).cloned()) })
        }

        fn list_roles(&self) -> BoxFut<'_, Vec<ProviderRole>> {
            Box::pin(async { Ok(self.roles.lock().unwrap().clone()) })
        }

        fn get_permission<'a>(&'a self, _name: &'a str) -> BoxFut<'a, Option<String>> {
            Box::pin(async { Ok(None) })
        }

        fn list_permissions(&self) -> BoxFut<'_, Vec<String>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn list_resources(&self) -> BoxFut<'_, Vec<String>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn synchronize(&self) -> BoxFut<'_, ()> {
            Box::pin(async { Ok(()) })
        }
    }
}
