//! `GetIdentitiesWithFilter` (§4.E): parallel `ListIdentities` fan-out,
//! deduplication by mappable identifier, kind filtering, and fallback to the
//! current user.

use std::collections::HashMap;
use thand_core::{Group, Identity, Principal, User};
use thand_providers::{Capability, ProviderSet};

/// Which discriminant of [`Principal`] a caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Group,
    All,
}

impl IdentityKind {
    fn matches(self, principal: &Principal) -> bool {
        match (self, principal) {
            (IdentityKind::All, _) => true,
            (IdentityKind::User, Principal::User(_)) => true,
            (IdentityKind::Group, Principal::Group(_)) => true,
            _ => false,
        }
    }

    fn includes_users(self) -> bool {
        matches!(self, IdentityKind::User | IdentityKind::All)
    }
}

/// Aggregates identities across every identity-capable provider.
///
/// Deduplication is by [`Identity::mappable_identifier`]; which provider's
/// record is kept for a colliding key depends on unordered map iteration and
/// is not made deterministic (§5, §9 Open Question 2) — callers must not
/// depend on a particular provider's record surviving a collision beyond the
/// field-level merge described below.
pub async fn get_identities_with_filter(
    providers: &ProviderSet,
    current_user: Option<&Identity>,
    kind: IdentityKind,
    search: &str,
) -> Vec<Identity> {
    let workers: Vec<_> = providers.with_capability(Capability::Identities).collect();

    if workers.is_empty() {
        return match current_user {
            Some(user) if kind.includes_users() && matches_search(user, search) => vec![user.clone()],
            _ => Vec::new(),
        };
    }

    let mut handles = Vec::with_capacity(workers.len());
    for active in workers {
        let adapter = active.adapter.clone();
        let search = search.to_string();
        handles.push(tokio::spawn(async move { adapter.list_identities(&search).await }));
    }

    let mut by_key: HashMap<String, Identity> = HashMap::new();
    for handle in handles {
        match handle.await {
            Ok(Ok(identities)) => {
                for identity in identities {
                    merge_into(&mut by_key, identity);
                }
            }
            Ok(Err(e)) => tracing::warn!(error = %e, "identity provider list_identities failed"),
            Err(e) => tracing::warn!(error = %e, "identity provider list_identities task panicked"),
        }
    }

    let mut aggregate: Vec<Identity> =
        by_key.into_values().filter(|i| kind.matches(&i.principal)).collect();

    if aggregate.is_empty() && search.is_empty() && kind.includes_users() {
        if let Some(user) = current_user {
            aggregate.push(user.clone());
        }
    }

    aggregate
}

fn matches_search(identity: &Identity, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let search = search.to_lowercase();
    match identity.user() {
        Some(user) => {
            user.email.to_lowercase().contains(&search) || user.name.to_lowercase().contains(&search)
        }
        None => false,
    }
}

/// Inserts `incoming` keyed by its mappable identifier. The first provider
/// to contribute a key wins the record; a later provider's value for the
/// same key only fills fields the existing record left empty.
fn merge_into(by_key: &mut HashMap<String, Identity>, incoming: Identity) {
    let key = incoming.mappable_identifier();
    by_key
        .entry(key)
        .and_modify(|existing| merge_fields(existing, &incoming))
        .or_insert(incoming);
}

fn merge_fields(existing: &mut Identity, incoming: &Identity) {
    if existing.label.is_empty() {
        existing.label = incoming.label.clone();
    }
    match (&mut existing.principal, &incoming.principal) {
        (Principal::User(e), Principal::User(i)) => merge_user(e, i),
        (Principal::Group(e), Principal::Group(i)) => merge_group(e, i),
        // Same mappable identifier but different discriminants: keep the
        // first provider's record untouched rather than guess which wins.
        _ => {}
    }
    for provider_ref in &incoming.provider_refs {
        if !existing.provider_refs.contains(provider_ref) {
            existing.provider_refs.push(provider_ref.clone());
        }
    }
}

fn merge_user(existing: &mut User, incoming: &User) {
    if existing.email.is_empty() {
        existing.email = incoming.email.clone();
    }
    if existing.username.is_empty() {
        existing.username = incoming.username.clone();
    }
    if existing.name.is_empty() {
        existing.name = incoming.name.clone();
    }
    if existing.domain.is_empty() {
        existing.domain = incoming.domain.clone();
    }
    if existing.source.is_empty() {
        existing.source = incoming.source.clone();
    }
    for group in &incoming.groups {
        if !existing.groups.contains(group) {
            existing.groups.push(group.clone());
        }
    }
}

fn merge_group(existing: &mut Group, incoming: &Group) {
    if existing.name.is_empty() {
        existing.name = incoming.name.clone();
    }
    if existing.source.is_empty() {
        existing.source = incoming.source.clone();
    }
}
