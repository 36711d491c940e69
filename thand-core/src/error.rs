//! Core error kinds (§7): manual enum, hand-written `Display`/`Error` impls,
//! no `thiserror`. Mirrors the shape of `r2e-core`'s `AppError`.

/// Errors raised by the loader, permission calculus, role composition, and
/// config root.
#[derive(Debug)]
pub enum CoreError {
    /// Empty or unparseable definition document.
    InvalidInput(String),
    /// A role named in `inherits` (or requested directly) has no definition.
    RoleNotFound(String),
    /// `name` recurred in the composition's visited set.
    CyclicInheritance(String),
    /// Inheritance walk exceeded `MaxInheritanceDepth`.
    DepthExceeded { role: String, max_depth: usize },
    /// A per-role or slice cap was exceeded.
    LimitExceeded { role: String, detail: String },
    /// A vault reference was configured but no vault backend is available.
    VaultUnavailable(String),
    /// Wraps an I/O or parse failure encountered while loading config.
    Load(String),
    /// The requested key was not found in the flattened config map.
    ConfigNotFound(String),
    /// A config value could not be converted to the requested type.
    ConfigTypeMismatch { key: String, expected: &'static str },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CoreError::RoleNotFound(name) => write!(f, "role not found: {name}"),
            CoreError::CyclicInheritance(name) => {
                write!(f, "cyclic inheritance detected at role: {name}")
            }
            CoreError::DepthExceeded { role, max_depth } => {
                write!(f, "inheritance depth exceeded for role '{role}' (max {max_depth})")
            }
            CoreError::LimitExceeded { role, detail } => {
                write!(f, "limit exceeded for role '{role}': {detail}")
            }
            CoreError::VaultUnavailable(key) => write!(f, "vault unavailable for: {key}"),
            CoreError::Load(msg) => write!(f, "load error: {msg}"),
            CoreError::ConfigNotFound(key) => write!(f, "config key not found: {key}"),
            CoreError::ConfigTypeMismatch { key, expected } => {
                write!(f, "config type mismatch for '{key}': expected {expected}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Load(err.to_string())
    }
}

/// Generate `From<E> for CoreError` implementations that map error types to
/// a specific `CoreError` variant taking a single `String` field.
#[macro_export]
macro_rules! map_error {
    ( $( $err_ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$err_ty> for $crate::error::CoreError {
                fn from(err: $err_ty) -> Self {
                    $crate::error::CoreError::$variant(err.to_string())
                }
            }
        )*
    };
}

map_error! {
    serde_json::Error => Load,
    serde_yaml::Error => Load,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formatting() {
        assert_eq!(
            CoreError::RoleNotFound("enhanced-dev".into()).to_string(),
            "role not found: enhanced-dev"
        );
        assert_eq!(
            CoreError::DepthExceeded { role: "a".into(), max_depth: 10 }.to_string(),
            "inheritance depth exceeded for role 'a' (max 10)"
        );
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CoreError = io_err.into();
        match err {
            CoreError::Load(msg) => assert!(msg.contains("missing")),
            other => panic!("expected Load, got {other}"),
        }
    }
}
