//! `isRoleApplicableToIdentity` (§4.C): case-insensitive scope matching.

use thand_core::{Identity, Scopes};

/// True when `scopes` imposes no restriction, or `identity` matches at least
/// one of its user/group/domain lists. Matching is case-insensitive against
/// email, username, id, group name, and domain (§4.C).
pub fn is_role_applicable_to_identity(scopes: Option<&Scopes>, identity: &Identity) -> bool {
    let Some(scopes) = scopes else { return true };
    if scopes.is_empty() {
        return true;
    }

    if !scopes.users.is_empty() {
        if let Some(user) = identity.user() {
            let candidates =
                [user.email.as_str(), user.username.as_str(), user.id.as_str(), identity.id.as_str()];
            if scopes.users.iter().any(|s| candidates.iter().any(|c| eq_ci(c, s))) {
                return true;
            }
        }
    }

    if !scopes.groups.is_empty() {
        if let Some(user) = identity.user() {
            if scopes.groups.iter().any(|s| user.groups.iter().any(|g| eq_ci(g, s))) {
                return true;
            }
        }
        if let Some(group) = identity.group() {
            if scopes.groups.iter().any(|s| eq_ci(&group.name, s) || eq_ci(&group.id, s)) {
                return true;
            }
        }
    }

    if !scopes.domains.is_empty() {
        if let Some(user) = identity.user() {
            if scopes.domains.iter().any(|s| eq_ci(&user.domain, s)) {
                return true;
            }
        }
    }

    false
}

fn eq_ci(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thand_core::{Principal, User};

    fn user_identity(email: &str, username: &str, groups: Vec<&str>, domain: &str) -> Identity {
        Identity {
            id: "id1".into(),
            label: String::new(),
            principal: Principal::User(User {
                id: "id1".into(),
                email: email.into(),
                username: username.into(),
                groups: groups.into_iter().map(String::from).collect(),
                domain: domain.into(),
                ..Default::default()
            }),
            provider_refs: vec![],
        }
    }

    #[test]
    fn empty_scopes_allow_everyone() {
        let id = user_identity("a@example.com", "a", vec![], "");
        assert!(is_role_applicable_to_identity(None, &id));
        assert!(is_role_applicable_to_identity(Some(&Scopes::default()), &id));
    }

    #[test]
    fn matches_email_case_insensitively() {
        let id = user_identity("John.Doe@Example.com", "jdoe", vec![], "");
        let scopes = Scopes { users: vec!["john.doe@example.com".into()], ..Default::default() };
        assert!(is_role_applicable_to_identity(Some(&scopes), &id));
    }

    #[test]
    fn matches_group_membership() {
        let id = user_identity("a@example.com", "a", vec!["Engineers"], "");
        let scopes = Scopes { groups: vec!["engineers".into()], ..Default::default() };
        assert!(is_role_applicable_to_identity(Some(&scopes), &id));
    }

    #[test]
    fn non_matching_scopes_reject() {
        let id = user_identity("a@example.com", "a", vec![], "corp.example.com");
        let scopes = Scopes { domains: vec!["other.example.com".into()], ..Default::default() };
        assert!(!is_role_applicable_to_identity(Some(&scopes), &id));
    }
}
