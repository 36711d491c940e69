//! Config Root (§4.H): the canonical in-memory `roles`/`workflows`/`providers`
//! maps plus the process `RunMode`, with parallel reload and merge-patch
//! application.

use crate::document::{extract_providers, extract_roles, extract_workflows};
use crate::patch::apply_merge_patch;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thand_core::loader::{resolve, DefinitionKind, SecretFetcher, SourceSpec, UrlFetcher};
use thand_core::{CoreError, Provider, RunMode, Role};
use thand_roles::RoleLookup;

#[derive(Default)]
struct Sections {
    roles: HashMap<String, Role>,
    workflows: HashMap<String, serde_json::Value>,
    providers: HashMap<String, Provider>,
}

/// Owns the canonical definitions maps. Reload re-resolves each section's
/// `SourceSpec` in parallel (three `tokio::spawn` tasks joined with
/// `tokio::try_join!`, matching the provider-init fan-out in §4.D); the maps
/// themselves sit behind one short-held `std::sync::Mutex`, consistent with
/// `r2e-core::config`'s use of plain mutexes for in-memory maps rather than
/// async locks (§4.H).
pub struct ConfigRoot {
    mode: RunMode,
    roles_source: SourceSpec,
    workflows_source: SourceSpec,
    providers_source: SourceSpec,
    url_fetcher: Option<Arc<dyn UrlFetcher>>,
    secret_fetcher: Option<Arc<dyn SecretFetcher>>,
    sections: Mutex<Sections>,
}

impl ConfigRoot {
    pub fn new(
        mode: RunMode,
        roles_source: SourceSpec,
        workflows_source: SourceSpec,
        providers_source: SourceSpec,
        url_fetcher: Option<Arc<dyn UrlFetcher>>,
        secret_fetcher: Option<Arc<dyn SecretFetcher>>,
    ) -> Self {
        Self {
            mode,
            roles_source,
            workflows_source,
            providers_source,
            url_fetcher,
            secret_fetcher,
            sections: Mutex::new(Sections::default()),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Re-resolves all three sources concurrently and swaps in the result.
    /// A role whose limits are violated is dropped with a warning rather
    /// than failing the whole reload (§7 `LimitExceededKind`, load-time
    /// recovery column).
    pub async fn reload(&self) -> Result<(), CoreError> {
        let url_fetcher = self.url_fetcher.clone();
        let secret_fetcher = self.secret_fetcher.clone();

        let roles_spec = self.roles_source.clone();
        let uf = url_fetcher.clone();
        let sf = secret_fetcher.clone();
        let roles_task = tokio::spawn(async move {
            load_section(DefinitionKind::Role, &roles_spec, uf.as_deref(), sf.as_deref(), extract_roles).await
        });

        let workflows_spec = self.workflows_source.clone();
        let uf = url_fetcher.clone();
        let sf = secret_fetcher.clone();
        let workflows_task = tokio::spawn(async move {
            load_section(DefinitionKind::Workflow, &workflows_spec, uf.as_deref(), sf.as_deref(), extract_workflows)
                .await
        });

        let providers_spec = self.providers_source.clone();
        let uf = url_fetcher.clone();
        let sf = secret_fetcher.clone();
        let providers_task = tokio::spawn(async move {
            load_section(DefinitionKind::Provider, &providers_spec, uf.as_deref(), sf.as_deref(), extract_providers)
                .await
        });

        let (mut roles, workflows, providers) = tokio::try_join!(
            flatten_join(roles_task),
            flatten_join(workflows_task),
            flatten_join(providers_task),
        )?;

        drop_invalid_roles(&mut roles);

        let mut sections = self.sections.lock().unwrap();
        sections.roles = roles;
        sections.workflows = workflows;
        sections.providers = providers;
        Ok(())
    }

    pub fn get_role(&self, name: &str) -> Option<Role> {
        self.sections.lock().unwrap().roles.get(name).cloned()
    }

    pub fn get_provider(&self, name: &str) -> Option<Provider> {
        self.sections.lock().unwrap().providers.get(name).cloned()
    }

    pub fn get_workflow(&self, name: &str) -> Option<serde_json::Value> {
        self.sections.lock().unwrap().workflows.get(name).cloned()
    }

    pub fn roles(&self) -> HashMap<String, Role> {
        self.sections.lock().unwrap().roles.clone()
    }

    pub fn providers(&self) -> HashMap<String, Provider> {
        self.sections.lock().unwrap().providers.clone()
    }

    pub fn workflows(&self) -> HashMap<String, serde_json::Value> {
        self.sections.lock().unwrap().workflows.clone()
    }

    /// Applies a JSON merge patch (RFC 7396) against the current
    /// roles/workflows/providers document, re-indexing into typed maps and
    /// dropping any role that now violates its limits (§4.H, §9).
    pub fn merge_configuration(&self, patch: &serde_json::Value) -> Result<(), CoreError> {
        let current = {
            let sections = self.sections.lock().unwrap();
            serde_json::json!({
                "roles": sections.roles,
                "workflows": sections.workflows,
                "providers": sections.providers,
            })
        };

        let merged = apply_merge_patch(&current, patch);
        let mut roles = extract_roles(&merged)?;
        drop_invalid_roles(&mut roles);
        let workflows = extract_workflows(&merged)?;
        let providers = extract_providers(&merged)?;

        let mut sections = self.sections.lock().unwrap();
        sections.roles = roles;
        sections.workflows = workflows;
        sections.providers = providers;
        Ok(())
    }
}

impl RoleLookup for ConfigRoot {
    fn get_role(&self, name: &str) -> Option<Role> {
        ConfigRoot::get_role(self, name)
    }
}

async fn load_section<T, F>(
    kind: DefinitionKind,
    spec: &SourceSpec,
    url_fetcher: Option<&dyn UrlFetcher>,
    secret_fetcher: Option<&dyn SecretFetcher>,
    extract: F,
) -> Result<HashMap<String, T>, CoreError>
where
    F: Fn(&serde_json::Value) -> Result<HashMap<String, T>, CoreError>,
{
    let defs = resolve(kind, spec, url_fetcher, secret_fetcher).await?;
    let mut out = HashMap::new();
    for def in defs {
        out.extend(extract(&def.body)?);
    }
    Ok(out)
}

async fn flatten_join<T>(handle: tokio::task::JoinHandle<Result<T, CoreError>>) -> Result<T, CoreError> {
    match handle.await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(e),
        Err(join_err) => Err(CoreError::Load(join_err.to_string())),
    }
}

fn drop_invalid_roles(roles: &mut HashMap<String, Role>) {
    roles.retain(|name, role| match role.validate_limits() {
        Ok(()) => true,
        Err(detail) => {
            tracing::warn!(role = %name, %detail, "dropping role that violates limits");
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root_with_inline(roles_json: &str) -> ConfigRoot {
        ConfigRoot::new(
            RunMode::Server,
            SourceSpec { inline: Some(roles_json.to_string()), ..Default::default() },
            SourceSpec::default(),
            SourceSpec::default(),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn reload_populates_roles_from_inline_source() {
        let root = root_with_inline(r#"{"version":"1.0","roles":{"base-reader":{"name":"base-reader"}}}"#);
        root.reload().await.unwrap();
        assert!(root.get_role("base-reader").is_some());
    }

    #[test]
    fn merge_configuration_applies_patch_and_reindexes() {
        let root = ConfigRoot::new(
            RunMode::Server,
            SourceSpec::default(),
            SourceSpec::default(),
            SourceSpec::default(),
            None,
            None,
        );
        let patch = json!({
            "roles": {
                "base-reader": {"name": "base-reader", "description": "read-only"}
            }
        });
        root.merge_configuration(&patch).unwrap();
        let role = root.get_role("base-reader").unwrap();
        assert_eq!(role.description, "read-only");
    }

    #[test]
    fn merge_configuration_drops_role_exceeding_limits() {
        let root = ConfigRoot::new(
            RunMode::Server,
            SourceSpec::default(),
            SourceSpec::default(),
            SourceSpec::default(),
            None,
            None,
        );
        let huge_allow: Vec<String> = (0..600).map(|i| format!("perm{i}")).collect();
        let patch = json!({
            "roles": {
                "overgrown": {"name": "overgrown", "permissions": {"allow": huge_allow}}
            }
        });
        root.merge_configuration(&patch).unwrap();
        assert!(root.get_role("overgrown").is_none());
    }
}
