//! Permission calculus (§4.B): `expand`, `condense`, `is_condensable`.
//!
//! Pure functions, no shared state — safe to call from any thread
//! concurrently (§9 "Global state").

use crate::model::limits::MAX_PERMISSIONS;
use std::collections::{BTreeMap, BTreeSet};

/// True iff `p` contains a `":"` and the substring after the last `":"`
/// contains no `"."`.
pub fn is_condensable(p: &str) -> bool {
    match p.rfind(':') {
        Some(idx) => !p[idx + 1..].contains('.'),
        None => false,
    }
}

/// Expand a single permission string into its constituent singleton forms.
///
/// - No `":"` ⇒ returned unchanged, as the sole element.
/// - Tail (after the last `":"`) contains `"."` ⇒ atomic (GCP-style),
///   returned unchanged.
/// - Otherwise the tail is a comma-separated action list; each element is
///   trimmed, empties dropped, and re-joined with the resource prefix.
pub fn expand(p: &str) -> Vec<String> {
    let Some(idx) = p.rfind(':') else {
        return vec![p.to_string()];
    };
    let (resource, tail) = (&p[..idx], &p[idx + 1..]);
    if tail.contains('.') {
        return vec![p.to_string()];
    }
    tail.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(|a| format!("{resource}:{a}"))
        .collect()
}

/// Expand every item of `list`, flattening the result. Guards against
/// resource exhaustion: if `list.len() > MaxPermissions`, logs and returns
/// an empty vector rather than expanding (§4.B safety guard).
pub fn expand_all(list: &[String]) -> Vec<String> {
    if list.len() > MAX_PERMISSIONS {
        tracing::error!(
            count = list.len(),
            max = MAX_PERMISSIONS,
            "permission list exceeds MaxPermissions; refusing to expand"
        );
        return Vec::new();
    }
    list.iter().flat_map(|p| expand(p)).collect()
}

/// Condense a list of (already expanded, singleton-action) permissions back
/// into their compact form (§4.B).
pub fn condense(list: &[String]) -> Vec<String> {
    if list.len() > MAX_PERMISSIONS {
        tracing::error!(
            count = list.len(),
            max = MAX_PERMISSIONS,
            "permission list exceeds MaxPermissions; refusing to condense"
        );
        return Vec::new();
    }

    let mut atomic: Vec<String> = Vec::new();
    // resource -> set of actions
    let mut grouped: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for p in list {
        let Some(idx) = p.rfind(':') else {
            // No resource/action separator at all: nothing to condense,
            // carried through unchanged like an atomic item.
            atomic.push(p.clone());
            continue;
        };
        let (resource, action) = (&p[..idx], &p[idx + 1..]);
        if action.contains('.') {
            atomic.push(p.clone());
            continue;
        }
        grouped.entry(resource.to_string()).or_default().insert(action.to_string());
    }

    // Resources that carry an explicit wildcard.
    let wildcards: BTreeSet<&str> = grouped
        .iter()
        .filter(|(_, actions)| actions.contains("*"))
        .map(|(r, _)| r.as_str())
        .collect();

    let mut out: Vec<String> = Vec::new();
    for (resource, actions) in &grouped {
        // Subsumption: a resource with a strict prefix match against some
        // wildcard resource `w` (resource starts with "w:") is dropped,
        // unless the resource is itself the wildcard holder.
        let subsumed = wildcards.iter().any(|w| {
            *w != resource.as_str() && resource.starts_with(&format!("{w}:"))
        });
        if subsumed {
            continue;
        }
        if actions.contains("*") {
            out.push(format!("{resource}:*"));
        } else if actions.len() == 1 {
            let only = actions.iter().next().unwrap();
            out.push(format!("{resource}:{only}"));
        } else {
            let mut sorted: Vec<&str> = actions.iter().map(String::as_str).collect();
            sorted.sort_unstable();
            out.push(format!("{resource}:{}", sorted.join(",")));
        }
    }
    out.extend(atomic);
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_no_colon_passthrough() {
        assert_eq!(expand("wildcardonly"), vec!["wildcardonly".to_string()]);
    }

    #[test]
    fn expand_atomic_gcp_style_unchanged() {
        assert_eq!(
            expand("gcp-prod:compute.instances.start"),
            vec!["gcp-prod:compute.instances.start".to_string()]
        );
    }

    #[test]
    fn expand_condensed_action_list() {
        assert_eq!(
            expand("s3:listBuckets,getBucketLocation"),
            vec!["s3:listBuckets".to_string(), "s3:getBucketLocation".to_string()]
        );
    }

    #[test]
    fn is_condensable_detects_dotted_action() {
        assert!(is_condensable("ec2:DescribeInstances"));
        assert!(!is_condensable("gcp-prod:compute.instances.start"));
        assert!(!is_condensable("no-colon-here"));
    }

    /// S1 (condense k8s + wildcard + GCP), SPEC_FULL §8.
    #[test]
    fn s1_condense_wildcard_and_gcp() {
        let input: Vec<String> = [
            "ec2:DescribeInstances",
            "ec2:*",
            "ec2:StartInstances",
            "rds:*",
            "rds:describeDBInstances",
            "s3:listBuckets",
            "s3:getBucketLocation",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let result = condense(&input);
        assert_eq!(
            result,
            vec![
                "ec2:*".to_string(),
                "rds:*".to_string(),
                "s3:getBucketLocation,listBuckets".to_string(),
            ]
        );
    }

    /// S2 (GCP atomicity), SPEC_FULL §8.
    #[test]
    fn s2_gcp_atomic_items_survive_unchanged() {
        let input: Vec<String> = [
            "gcp-prod:compute.instances.start",
            "gcp-prod:compute.instances.stop",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(condense(&input), input);
    }

    /// Invariant 2: condense is idempotent.
    #[test]
    fn condense_is_idempotent() {
        let input: Vec<String> = [
            "ec2:DescribeInstances",
            "ec2:*",
            "s3:listBuckets",
            "gcp-prod:compute.instances.start",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let once = condense(&input);
        let twice = condense(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn expand_all_guards_resource_exhaustion() {
        let huge: Vec<String> = (0..MAX_PERMISSIONS + 1).map(|i| format!("svc:act{i}")).collect();
        assert!(expand_all(&huge).is_empty());
    }
}
