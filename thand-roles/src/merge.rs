//! Merge semantics for composing a child role with its resolved parent
//! (§4.C). Used identically for `permissions`, `resources`, and `groups`.

use std::collections::BTreeSet;
use thand_core::permissions::{condense, expand_all};
use thand_core::AllowDeny;

/// `final_allow = childAllow ∪ (parentAllow \ parentDeny)`
/// `final_deny  = childDeny  ∪ (parentDeny \ parentAllow)`
///
/// then any item left in both sets is an internal conflict: deny wins, so
/// the item is removed from `allow`, but it is *also* dropped from `deny` —
/// the conflict is cleared rather than left as a redundant deny entry,
/// since the item is absent from `allow` already implies it is not granted.
///
/// Operates on raw strings with no expansion — the merge semantics for
/// `resources` and `groups` (§4.C: "same union/difference over raw strings
/// (no expansion)"). Permissions use [`merge_permissions`] instead, which
/// expands to singleton form first.
pub fn merge_allow_deny(child: &AllowDeny, parent: &AllowDeny) -> AllowDeny {
    let parent_allow: BTreeSet<&str> = parent.allow.iter().map(String::as_str).collect();
    let parent_deny: BTreeSet<&str> = parent.deny.iter().map(String::as_str).collect();

    let mut allow: BTreeSet<String> = child.allow.iter().cloned().collect();
    allow.extend(parent_allow.difference(&parent_deny).map(|s| s.to_string()));

    let mut deny: BTreeSet<String> = child.deny.iter().cloned().collect();
    deny.extend(parent_deny.difference(&parent_allow).map(|s| s.to_string()));

    let conflicts: BTreeSet<String> = allow.intersection(&deny).cloned().collect();
    for item in &conflicts {
        allow.remove(item);
        deny.remove(item);
    }

    AllowDeny { allow: allow.into_iter().collect(), deny: deny.into_iter().collect() }
}

/// Permission-specific merge (§4.C): "Permissions: expand both sides to
/// singleton sets. Compute `final_allow`/`final_deny`... Condense final
/// sets." Expands both sides to singletons, runs the same allow/deny
/// algebra as [`merge_allow_deny`] (which also clears any item left in both
/// sets), then condenses the result back to compact form.
pub fn merge_permissions(child: &AllowDeny, parent: &AllowDeny) -> AllowDeny {
    let child_expanded = AllowDeny { allow: expand_all(&child.allow), deny: expand_all(&child.deny) };
    let parent_expanded = AllowDeny { allow: expand_all(&parent.allow), deny: expand_all(&parent.deny) };
    let merged = merge_allow_deny(&child_expanded, &parent_expanded);
    AllowDeny { allow: condense(&merged.allow), deny: condense(&merged.deny) }
}

/// Resolves a raw set's own internal allow/deny overlap with no merge and
/// no expansion — the degenerate case of `merge_allow_deny` against an
/// empty parent. Used to finalize `resources`/`groups` on a composite
/// regardless of whether it inherited anything (§4.C steps 3 and 5 converge
/// on the same operation). Permissions use `merge_permissions` against an
/// empty parent instead, so the expand/condense step still runs.
pub fn clear_conflicts(set: &AllowDeny) -> AllowDeny {
    merge_allow_deny(set, &AllowDeny::default())
}
