//! `GetCompositeRole` / `GetCompositeRoleByName` (§4.C): recursive
//! inheritance resolution over the role DAG.

use crate::error::RoleError;
use crate::filter::{filter_by_provider, filter_list_by_provider, InheritTarget, ProviderRef};
use crate::lookup::RoleLookup;
use crate::merge::{clear_conflicts, merge_allow_deny, merge_permissions};
use crate::scope::is_role_applicable_to_identity;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use thand_core::model::limits::{MAX_GROUPS, MAX_INHERITANCE_DEPTH, MAX_PERMISSIONS, MAX_RESOURCES};
use thand_core::{AllowDeny, Identity, Scopes};
use thand_providers::ProviderSet;

/// The fully resolved role a requesting identity ends up holding: every
/// inherited `Role`'s allow/deny sets merged in, and every provider-prefixed
/// inherit confirmed to exist and retained as an opaque reference for
/// downstream provider calls (§4.C step 4).
#[derive(Debug, Clone, Default)]
pub struct CompositeRole {
    pub name: String,
    pub description: String,
    pub permissions: AllowDeny,
    pub resources: AllowDeny,
    pub groups: AllowDeny,
    pub workflows: Vec<String>,
    pub providers: Vec<String>,
    pub provider_role_refs: Vec<String>,
    pub scopes: Option<Scopes>,
}

impl CompositeRole {
    /// Re-checks the per-role limits (§3) against the composed result, since
    /// merging can grow `permissions`/`resources`/`groups` past what any
    /// single contributing role had (§4.C step 5).
    fn validate_limits(&self) -> Result<(), String> {
        if self.permissions.allow.len() > MAX_PERMISSIONS || self.permissions.deny.len() > MAX_PERMISSIONS {
            return Err("composite permissions exceed MaxPermissions".into());
        }
        if self.resources.allow.len() > MAX_RESOURCES || self.resources.deny.len() > MAX_RESOURCES {
            return Err("composite resources exceed MaxResources".into());
        }
        if self.groups.allow.len() > MAX_GROUPS || self.groups.deny.len() > MAX_GROUPS {
            return Err("composite groups exceed MaxGroups".into());
        }
        Ok(())
    }
}

type BoxFut<'a> = Pin<Box<dyn Future<Output = Result<CompositeRole, RoleError>> + Send + 'a>>;

/// Entry point: resolves `name` against `lookup`, merging in every
/// transitively inherited role and confirming every provider-prefixed
/// inherit via `providers`, scoped to `identity`.
pub async fn get_composite_role_by_name(
    name: &str,
    lookup: &dyn RoleLookup,
    providers: &ProviderSet,
    identity: &Identity,
) -> Result<CompositeRole, RoleError> {
    compose(name, lookup, providers, identity, HashSet::new(), 0).await
}

fn compose<'a>(
    name: &'a str,
    lookup: &'a dyn RoleLookup,
    providers: &'a ProviderSet,
    identity: &'a Identity,
    visited: HashSet<String>,
    depth: usize,
) -> BoxFut<'a> {
    Box::pin(async move {
        if depth >= MAX_INHERITANCE_DEPTH {
            return Err(RoleError::DepthExceeded { role: name.to_string(), max_depth: MAX_INHERITANCE_DEPTH });
        }
        if visited.contains(name) {
            return Err(RoleError::CyclicInheritance(name.to_string()));
        }

        let role = lookup.get_role(name).ok_or_else(|| RoleError::RoleNotFound(name.to_string()))?;
        if !role.enabled {
            return Err(RoleError::InvalidRole(format!("role '{name}' is disabled")));
        }
        role.validate_limits().map_err(|detail| RoleError::LimitExceeded { role: name.to_string(), detail })?;

        if !is_role_applicable_to_identity(role.scopes.as_ref(), identity) {
            return Err(RoleError::InvalidRole(format!(
                "role '{name}' is not applicable to the requesting identity"
            )));
        }

        let provider_refs: Vec<ProviderRef> = providers
            .iter()
            .map(|p| ProviderRef { name: p.definition.name.clone(), engine: p.definition.engine.clone() })
            .collect();

        let mut composite = CompositeRole {
            name: role.name.clone(),
            description: role.description.clone(),
            permissions: AllowDeny {
                allow: filter_list_by_provider(&role.permissions.allow, &provider_refs, &role.providers),
                deny: filter_list_by_provider(&role.permissions.deny, &provider_refs, &role.providers),
            },
            resources: AllowDeny {
                allow: filter_list_by_provider(&role.resources.allow, &provider_refs, &role.providers),
                deny: filter_list_by_provider(&role.resources.deny, &provider_refs, &role.providers),
            },
            groups: AllowDeny {
                allow: filter_list_by_provider(&role.groups.allow, &provider_refs, &role.providers),
                deny: filter_list_by_provider(&role.groups.deny, &provider_refs, &role.providers),
            },
            workflows: role.workflows.clone(),
            providers: role.providers.clone(),
            provider_role_refs: Vec::new(),
            scopes: role.scopes.clone(),
        };

        let mut next_visited = visited;
        next_visited.insert(name.to_string());

        let known_providers: Vec<String> = providers.iter().map(|p| p.definition.name.clone()).collect();

        for entry in &role.inherits {
            match filter_by_provider(entry, &known_providers, &role.providers) {
                InheritTarget::Role(parent_name) => {
                    let parent =
                        compose(&parent_name, lookup, providers, identity, next_visited.clone(), depth + 1).await?;
                    composite.permissions = merge_permissions(&composite.permissions, &parent.permissions);
                    composite.resources = merge_allow_deny(&composite.resources, &parent.resources);
                    composite.groups = merge_allow_deny(&composite.groups, &parent.groups);
                    merge_unique(&mut composite.workflows, parent.workflows);
                    merge_unique(&mut composite.providers, parent.providers);
                    merge_unique(&mut composite.provider_role_refs, parent.provider_role_refs);
                }
                InheritTarget::ProviderRole { provider, role: provider_role_name } => {
                    let active = providers
                        .get(&provider)
                        .or_else(|| providers.resolve_by_prefix(&provider))
                        .ok_or_else(|| RoleError::RoleNotFound(format!("{provider}:{provider_role_name}")))?;
                    let found = active
                        .adapter
                        .get_role(&provider_role_name, identity)
                        .await
                        .map_err(|e| RoleError::InvalidRole(e.to_string()))?
                        .ok_or_else(|| RoleError::RoleNotFound(format!("{provider}:{provider_role_name}")))?;
                    let retained = found.retained_identifier().ok_or_else(|| {
                        RoleError::ProviderRoleMissingIdentifier {
                            provider: provider.clone(),
                            requested: provider_role_name.clone(),
                        }
                    })?;
                    let reference = format!("{provider}:{retained}");
                    if !composite.provider_role_refs.contains(&reference) {
                        composite.provider_role_refs.push(reference);
                    }
                }
                InheritTarget::Dropped => {}
            }
        }

        // §4.C steps 3/5: resolve internal allow/deny conflicts on the
        // composite unconditionally, whether or not anything was inherited.
        composite.permissions = merge_permissions(&composite.permissions, &AllowDeny::default());
        composite.resources = clear_conflicts(&composite.resources);
        composite.groups = clear_conflicts(&composite.groups);

        composite
            .validate_limits()
            .map_err(|detail| RoleError::LimitExceeded { role: name.to_string(), detail })?;

        Ok(composite)
    })
}

fn merge_unique(into: &mut Vec<String>, from: Vec<String>) {
    for item in from {
        if !into.contains(&item) {
            into.push(item);
        }
    }
}
