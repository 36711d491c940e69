//! `filterByProvider` (§4.C): classifies one entry of `Role.inherits`, and
//! filters the per-item `permissions`/`resources`/`groups` allow/deny lists
//! the same way (step 2).

/// A provider known to the composer, identified by either its configured
/// name or its engine type — §4.C step 2: "prefix matches a known provider
/// (by exact name **or** by its engine type)".
#[derive(Debug, Clone)]
pub struct ProviderRef {
    pub name: String,
    pub engine: String,
}

fn is_known_provider_prefix(prefix: &str, providers: &[ProviderRef]) -> bool {
    providers.iter().any(|p| p.name == prefix || p.engine == prefix)
}

/// Applies §4.C step 2 to one `permissions`/`resources`/`groups` item:
/// unprefixed items pass through unchanged; a prefix naming a known
/// provider is stripped and the item kept only if `role_providers` lists
/// that provider; any other provider-prefixed item is dropped.
pub fn filter_item_by_provider(item: &str, providers: &[ProviderRef], role_providers: &[String]) -> Option<String> {
    match item.split_once(':') {
        Some((prefix, rest)) if is_known_provider_prefix(prefix, providers) => {
            role_providers.iter().any(|p| p == prefix).then(|| rest.to_string())
        }
        _ => Some(item.to_string()),
    }
}

/// Applies [`filter_item_by_provider`] across a whole allow/deny list.
pub fn filter_list_by_provider(items: &[String], providers: &[ProviderRef], role_providers: &[String]) -> Vec<String> {
    items.iter().filter_map(|item| filter_item_by_provider(item, providers, role_providers)).collect()
}

/// What an `inherits` entry resolves to once checked against the set of
/// known provider names and the composing role's own `providers` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InheritTarget {
    /// A plain role name, resolved through [`crate::lookup::RoleLookup`].
    Role(String),
    /// A provider-prefixed reference (`provider`, `role name within it`),
    /// resolved through the provider's adapter.
    ProviderRole { provider: String, role: String },
    /// The prefix names a known provider, but the composing role does not
    /// list that provider in `providers` — dropped silently per §4.C.
    Dropped,
}

/// Splits `entry` on the first `:` and checks the prefix against
/// `known_providers`. A prefix that names a known provider is only honored
/// when `role_providers` also lists it; otherwise the whole entry is
/// dropped rather than misread as a literal role name containing a colon.
pub fn filter_by_provider(
    entry: &str,
    known_providers: &[String],
    role_providers: &[String],
) -> InheritTarget {
    match entry.split_once(':') {
        Some((prefix, rest)) if known_providers.iter().any(|p| p == prefix) => {
            if role_providers.iter().any(|p| p == prefix) {
                InheritTarget::ProviderRole { provider: prefix.to_string(), role: rest.to_string() }
            } else {
                InheritTarget::Dropped
            }
        }
        _ => InheritTarget::Role(entry.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_without_colon_is_a_role() {
        let known = vec!["aws-prod".to_string()];
        assert_eq!(filter_by_provider("base-operator", &known, &[]), InheritTarget::Role("base-operator".into()));
    }

    #[test]
    fn colon_prefix_not_a_known_provider_is_a_role_name() {
        // A role literally named "engine:word.word.word" is indistinguishable
        // from a permission string, but at the inherits level there's no such
        // ambiguity unless the prefix happens to collide with a provider.
        let known = vec!["aws-prod".to_string()];
        assert_eq!(
            filter_by_provider("gcp:roles.viewer", &known, &[]),
            InheritTarget::Role("gcp:roles.viewer".into())
        );
    }

    #[test]
    fn known_provider_prefix_listed_on_role_resolves_to_provider_role() {
        let known = vec!["aws-prod".to_string()];
        let role_providers = vec!["aws-prod".to_string()];
        assert_eq!(
            filter_by_provider("aws-prod:AdministratorAccess", &known, &role_providers),
            InheritTarget::ProviderRole { provider: "aws-prod".into(), role: "AdministratorAccess".into() }
        );
    }

    #[test]
    fn known_provider_prefix_not_listed_on_role_is_dropped() {
        let known = vec!["aws-prod".to_string()];
        assert_eq!(filter_by_provider("aws-prod:AdministratorAccess", &known, &[]), InheritTarget::Dropped);
    }

    #[test]
    fn item_without_provider_prefix_passes_through_unchanged() {
        let providers = vec![ProviderRef { name: "aws-prod".into(), engine: "aws".into() }];
        assert_eq!(
            filter_item_by_provider("k8s:pods:get,list", &providers, &[]),
            Some("k8s:pods:get,list".to_string())
        );
    }

    #[test]
    fn item_with_prefix_matching_engine_type_is_honored() {
        let providers = vec![ProviderRef { name: "aws-prod".into(), engine: "aws".into() }];
        let role_providers = vec!["aws".to_string()];
        assert_eq!(
            filter_item_by_provider("aws:ec2:DescribeInstances", &providers, &role_providers),
            Some("ec2:DescribeInstances".to_string())
        );
    }

    #[test]
    fn item_with_known_provider_prefix_not_on_role_is_dropped() {
        let providers = vec![ProviderRef { name: "aws-dev".into(), engine: "aws".into() }];
        assert_eq!(filter_item_by_provider("aws-dev:AdministratorAccess", &providers, &["aws-prod".into()]), None);
    }

    #[test]
    fn filter_list_drops_only_unlisted_provider_prefixed_items() {
        let providers = vec![ProviderRef { name: "aws-dev".into(), engine: "aws".into() }];
        let items = vec!["k8s:pods:get".to_string(), "aws-dev:AdministratorAccess".to_string()];
        let filtered = filter_list_by_provider(&items, &providers, &[]);
        assert_eq!(filtered, vec!["k8s:pods:get".to_string()]);
    }
}
