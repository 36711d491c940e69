//! Error kinds for role composition (§7).

#[derive(Debug)]
pub enum RoleError {
    /// Base or inherited role missing (`RoleNotFoundKind`).
    RoleNotFound(String),
    /// `name` recurred in the composition's visited set (`CyclicInheritanceKind`).
    CyclicInheritance(String),
    /// `|visited| >= MaxInheritanceDepth` (`DepthExceededKind`).
    DepthExceeded { role: String, max_depth: usize },
    /// A per-role or slice cap was exceeded (`LimitExceededKind`).
    LimitExceeded { role: String, detail: String },
    /// The composed role's name was empty, or the requested role was absent.
    InvalidRole(String),
    /// A `ProviderRole` returned by an adapter had neither `name` nor `id`
    /// (Open Question 3, resolved in DESIGN.md: fail explicitly).
    ProviderRoleMissingIdentifier { provider: String, requested: String },
}

impl std::fmt::Display for RoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleError::RoleNotFound(name) => write!(f, "role not found: {name}"),
            RoleError::CyclicInheritance(name) => write!(f, "cyclic inheritance detected at role: {name}"),
            RoleError::DepthExceeded { role, max_depth } => {
                write!(f, "inheritance depth exceeded for role '{role}' (max {max_depth})")
            }
            RoleError::LimitExceeded { role, detail } => {
                write!(f, "limit exceeded for role '{role}': {detail}")
            }
            RoleError::InvalidRole(msg) => write!(f, "invalid role: {msg}"),
            RoleError::ProviderRoleMissingIdentifier { provider, requested } => write!(
                f,
                "provider '{provider}' returned a role with no name or id for request '{requested}'"
            ),
        }
    }
}

impl std::error::Error for RoleError {}
