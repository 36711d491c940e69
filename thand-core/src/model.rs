//! Data model (§3): `Role`, `Provider`, `Identity`, `LogEntry`,
//! `SystemChunk`, `ConfigurationCursor`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-role and per-slice limits enforced during composition (§3).
pub mod limits {
    pub const MAX_PERMISSIONS: usize = 500;
    pub const MAX_RESOURCES: usize = 100;
    pub const MAX_GROUPS: usize = 50;
    pub const MAX_SCOPES: usize = 50;
    pub const MAX_INHERITS: usize = 50;
    pub const MAX_PROVIDERS: usize = 5;
    pub const MAX_WORKFLOWS: usize = 5;
    pub const MAX_INHERITANCE_DEPTH: usize = 10;
    pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;
    pub const LOG_RING_CAPACITY: usize = 1000;
    pub const CHUNK_ITEM_OVERHEAD: usize = 10;
}

/// An allow/deny pair shared by permissions, resources, and groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowDeny {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

/// An optional allow-list restricting which identities may use a role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Scopes {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

impl Scopes {
    /// True when the scope set imposes no restriction at all.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty() && self.domains.is_empty()
    }
}

/// A role definition (§3). `inherits` may name provider-prefixed roles
/// (e.g. `"aws-prod:AdministratorAccess"`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub workflows: Vec<String>,
    #[serde(default)]
    pub permissions: AllowDeny,
    #[serde(default)]
    pub resources: AllowDeny,
    #[serde(default)]
    pub groups: AllowDeny,
    #[serde(default)]
    pub scopes: Option<Scopes>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Role {
    /// Validates the per-role limits from §3. Returns the first violated
    /// limit's name for use in `CoreError::LimitExceeded`.
    pub fn validate_limits(&self) -> Result<(), String> {
        use limits::*;
        if self.permissions.allow.len() > MAX_PERMISSIONS
            || self.permissions.deny.len() > MAX_PERMISSIONS
        {
            return Err("permissions exceed MaxPermissions".into());
        }
        if self.resources.allow.len() > MAX_RESOURCES || self.resources.deny.len() > MAX_RESOURCES
        {
            return Err("resources exceed MaxResources".into());
        }
        if self.groups.allow.len() > MAX_GROUPS || self.groups.deny.len() > MAX_GROUPS {
            return Err("groups exceed MaxGroups".into());
        }
        if let Some(scopes) = &self.scopes {
            if scopes.users.len() > MAX_SCOPES
                || scopes.groups.len() > MAX_SCOPES
                || scopes.domains.len() > MAX_SCOPES
            {
                return Err("scopes exceed MaxScopes".into());
            }
        }
        if self.inherits.len() > MAX_INHERITS {
            return Err("inherits exceeds MaxInherits".into());
        }
        if self.providers.len() > MAX_PROVIDERS {
            return Err("providers exceeds MaxProviders".into());
        }
        if self.workflows.len() > MAX_WORKFLOWS {
            return Err("workflows exceeds MaxWorkflows".into());
        }
        Ok(())
    }
}

/// A provider definition (§3). `client` is intentionally absent here — the
/// bound adapter handle lives in the provider registry (`thand-providers`),
/// never serialized alongside the definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provider {
    pub name: String,
    pub engine: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub role: Option<ProviderRoleScope>,
}

/// `Provider.role` — restricts which identities may use this provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderRoleScope {
    #[serde(default)]
    pub scopes: Option<Scopes>,
}

/// A user identity (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub source: String,
}

/// A group identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: String,
}

/// The discriminated `User | Group` union backing `Identity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    User(User),
    Group(Group),
}

/// An identity assembled from one or more provider adapters (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub principal: Principal,
    #[serde(default)]
    pub provider_refs: Vec<String>,
}

impl Identity {
    pub fn user(&self) -> Option<&User> {
        match &self.principal {
            Principal::User(u) => Some(u),
            Principal::Group(_) => None,
        }
    }

    pub fn group(&self) -> Option<&Group> {
        match &self.principal {
            Principal::Group(g) => Some(g),
            Principal::User(_) => None,
        }
    }

    /// The canonical key used to deduplicate identities across providers
    /// (the "mappable identifier", GLOSSARY).
    pub fn mappable_identifier(&self) -> String {
        match &self.principal {
            Principal::User(u) if !u.email.is_empty() => u.email.to_lowercase(),
            Principal::User(u) if !u.username.is_empty() => u.username.to_lowercase(),
            Principal::Group(g) if !g.name.is_empty() => g.name.to_lowercase(),
            _ => self.id.to_lowercase(),
        }
    }
}

/// A role returned by a provider adapter's `GetRole`/`ListRoles` (§4.C, §4.D).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderRole {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

impl ProviderRole {
    /// The identifier retained in a composite role's `inherits` list: the
    /// name if present, else the id. Returns `None` when both are empty —
    /// callers must fail explicitly rather than insert an empty string
    /// (Open Question 3, resolved in DESIGN.md).
    pub fn retained_identifier(&self) -> Option<&str> {
        if !self.name.is_empty() {
            Some(&self.name)
        } else if !self.id.is_empty() {
            Some(&self.id)
        } else {
            None
        }
    }
}

/// Severity level of a `LogEntry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// A single event in the log ring buffer (§3, §4.F).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: chrono::DateTime<chrono::Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

/// One section of configuration data carried in a `SystemChunk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorSection {
    Roles,
    Workflows,
    Providers,
    Done,
}

impl CursorSection {
    /// The section that follows this one in the fixed traversal order.
    pub fn next(self) -> CursorSection {
        match self {
            CursorSection::Roles => CursorSection::Workflows,
            CursorSection::Workflows => CursorSection::Providers,
            CursorSection::Providers => CursorSection::Done,
            CursorSection::Done => CursorSection::Done,
        }
    }
}

/// A cursor through the serialized configuration used by the sync
/// orchestrator (§3, §4.G). Monotone; advances section-by-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationCursor {
    pub section: CursorSection,
    pub offset: usize,
}

impl ConfigurationCursor {
    /// The cursor an absent (`nil`) cursor implies: `{section: roles, offset: 0}`.
    pub fn initial() -> Self {
        ConfigurationCursor { section: CursorSection::Roles, offset: 0 }
    }

    pub fn is_done(&self) -> bool {
        self.section == CursorSection::Done
    }
}

/// Per-provider identity/role/permission data bundled into a `SystemChunk`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderChunkData {
    #[serde(default)]
    pub identities: Vec<Identity>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub provider_roles: Vec<ProviderRole>,
}

/// A bounded snapshot page of the configuration, serialized ≤ `MaxChunkSize` (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemChunk {
    #[serde(default)]
    pub roles: HashMap<String, Role>,
    #[serde(default)]
    pub workflows: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub providers: HashMap<String, Provider>,
    #[serde(default)]
    pub provider_data: HashMap<String, ProviderChunkData>,
}

/// Execution mode shared by SERVER/AGENT/CLIENT (§1, §4.D, §4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Server,
    Agent,
    Client,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_empty_when_all_lists_empty() {
        assert!(Scopes::default().is_empty());
        let s = Scopes { users: vec!["a".into()], ..Default::default() };
        assert!(!s.is_empty());
    }

    #[test]
    fn cursor_section_order() {
        assert_eq!(CursorSection::Roles.next(), CursorSection::Workflows);
        assert_eq!(CursorSection::Workflows.next(), CursorSection::Providers);
        assert_eq!(CursorSection::Providers.next(), CursorSection::Done);
        assert_eq!(CursorSection::Done.next(), CursorSection::Done);
    }

    #[test]
    fn provider_role_retained_identifier_prefers_name() {
        let pr = ProviderRole { name: "Admin".into(), id: "123".into() };
        assert_eq!(pr.retained_identifier(), Some("Admin"));
        let pr = ProviderRole { name: String::new(), id: "123".into() };
        assert_eq!(pr.retained_identifier(), Some("123"));
        let pr = ProviderRole::default();
        assert_eq!(pr.retained_identifier(), None);
    }

    #[test]
    fn mappable_identifier_prefers_email() {
        let id = Identity {
            id: "x".into(),
            label: String::new(),
            principal: Principal::User(User {
                id: "u1".into(),
                email: "John.Doe@Example.com".into(),
                username: "jdoe".into(),
                ..Default::default()
            }),
            provider_refs: vec![],
        };
        assert_eq!(id.mappable_identifier(), "john.doe@example.com");
    }
}
