//! Process-wide engine registry and per-provider instantiation (§4.D).
//!
//! The registry maps an engine name (`aws`, `gcp`, `k8s`, ...) to a
//! constructor; it is meant to be populated once at program start and never
//! mutated afterward outside test harnesses (§9 "Global state"), matching
//! how `r2e-openfga::registry::OpenFgaRegistry` is built once and shared via
//! `Arc`.

use crate::adapter::ProviderAdapter;
use crate::error::ProviderError;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use thand_core::Provider;

/// Builds a concrete adapter for one provider definition.
pub type EngineConstructor =
    Arc<dyn Fn(&Provider) -> Result<Arc<dyn ProviderAdapter>, ProviderError> + Send + Sync>;

/// Process-wide map of engine name → constructor.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    constructors: Arc<DashMap<String, EngineConstructor>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or override, for test harnesses) the constructor for an
    /// engine name.
    pub fn register(&self, engine: impl Into<String>, ctor: EngineConstructor) {
        self.constructors.insert(engine.into(), ctor);
    }

    /// Construct an adapter for `provider`, looking up its `engine` field.
    pub fn construct(&self, provider: &Provider) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
        let ctor = self
            .constructors
            .get(&provider.engine)
            .ok_or_else(|| ProviderError::EngineNotFound(provider.engine.clone()))?;
        ctor(provider)
    }
}

/// A provider definition bound to its instantiated, initialized adapter.
pub struct ActiveProvider {
    pub definition: Provider,
    pub adapter: Arc<dyn ProviderAdapter>,
}

/// The set of successfully initialized providers, keyed by provider name.
///
/// Providers that failed to initialize are omitted (logged, not fatal,
/// §4.D / §7 `ProviderInitFailedKind`).
#[derive(Default)]
pub struct ProviderSet {
    by_name: HashMap<String, ActiveProvider>,
}

impl ProviderSet {
    pub fn get(&self, name: &str) -> Option<&ActiveProvider> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveProvider> {
        self.by_name.values()
    }

    /// Resolve a provider prefix (from a permission/inherits item) against a
    /// provider's **name** or its **engine** type (§4.C step 2, §6
    /// "Permission syntax").
    pub fn resolve_by_prefix(&self, prefix: &str) -> Option<&ActiveProvider> {
        if let Some(p) = self.by_name.get(prefix) {
            return Some(p);
        }
        self.by_name.values().find(|p| p.definition.engine == prefix)
    }

    /// Inserts an already-constructed adapter directly, bypassing
    /// `instantiate_all`. Used by other crates' test suites to build a
    /// `ProviderSet` without a registry or real initialization round-trip.
    #[cfg(any(test, feature = "test-util"))]
    pub fn insert_for_test(
        &mut self,
        name: impl Into<String>,
        definition: Provider,
        adapter: Arc<dyn ProviderAdapter>,
    ) {
        self.by_name.insert(name.into(), ActiveProvider { definition, adapter });
    }

    /// Every provider advertising `capability`.
    pub fn with_capability(
        &self,
        capability: crate::adapter::Capability,
    ) -> impl Iterator<Item = &ActiveProvider> {
        self.by_name.values().filter(move |p| p.adapter.capabilities().contains(&capability))
    }
}

/// Instantiate and initialize every provider in `definitions` in parallel.
/// Failures are logged and the failing provider is omitted from the
/// returned set (§4.D). After successful init, `Synchronize` is launched
/// asynchronously and its result is best-effort.
pub async fn instantiate_all(
    registry: &EngineRegistry,
    definitions: &HashMap<String, Provider>,
) -> ProviderSet {
    let mut handles = Vec::with_capacity(definitions.len());
    for provider in definitions.values().filter(|p| p.enabled) {
        let provider = provider.clone();
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let adapter = registry.construct(&provider).map_err(|e| (provider.name.clone(), e.to_string()))?;
            adapter
                .initialize()
                .await
                .map_err(|e| (provider.name.clone(), e.to_string()))?;
            Ok::<_, (String, String)>(ActiveProvider { definition: provider, adapter })
        }));
    }

    let mut set = ProviderSet::default();
    for handle in handles {
        match handle.await {
            Ok(Ok(active)) => {
                let adapter = active.adapter.clone();
                set.by_name.insert(active.definition.name.clone(), active);
                tokio::spawn(async move {
                    if let Err(e) = adapter.synchronize().await {
                        tracing::warn!(error = %e, "provider synchronize failed (best-effort)");
                    }
                });
            }
            Ok(Err((name, detail))) => {
                tracing::error!(provider = %name, error = %detail, "provider initialization failed; omitting from active set");
            }
            Err(join_err) => {
                tracing::error!(error = %join_err, "provider initialization task panicked");
            }
        }
    }
    set
}
