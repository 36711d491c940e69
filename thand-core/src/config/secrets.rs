use crate::error::CoreError;

/// Secret resolution backend used to resolve `${...}` placeholders in
/// string config values (§3.1 `secret`, §6 vault fields).
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, CoreError>;
}

/// Default resolver: `file:`/`env:` prefixed references, or a bare
/// environment variable name.
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, CoreError> {
        if let Some(path) = reference.strip_prefix("file:") {
            std::fs::read_to_string(path.trim())
                .map(|s| s.trim().to_string())
                .map_err(|e| CoreError::Load(format!("secret file '{}': {e}", path.trim())))
        } else if let Some(var) = reference.strip_prefix("env:") {
            std::env::var(var.trim())
                .map_err(|_| CoreError::ConfigNotFound(format!("env:{}", var.trim())))
        } else {
            std::env::var(reference.trim())
                .map_err(|_| CoreError::ConfigNotFound(reference.trim().to_string()))
        }
    }
}

/// Resolve every `${...}` placeholder occurring in `value`.
pub fn resolve_placeholders(value: &str, resolver: &dyn SecretResolver) -> Result<String, CoreError> {
    let mut result = value.to_string();
    while let Some(start) = result.find("${") {
        let end = result[start..]
            .find('}')
            .ok_or_else(|| CoreError::InvalidInput(format!("unclosed placeholder in: {value}")))?;
        let reference = &result[start + 2..start + end];
        let resolved = resolver.resolve(reference)?;
        result = format!("{}{}{}", &result[..start], resolved, &result[start + end + 1..]);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_bare_env_var() {
        std::env::set_var("THAND_TEST_SECRET_PLAIN", "s3cr3t");
        let resolved = resolve_placeholders("${THAND_TEST_SECRET_PLAIN}", &DefaultSecretResolver).unwrap();
        assert_eq!(resolved, "s3cr3t");
    }

    #[test]
    fn resolves_env_prefixed_var() {
        std::env::set_var("THAND_TEST_SECRET_PREFIXED", "v2");
        let resolved =
            resolve_placeholders("${env:THAND_TEST_SECRET_PREFIXED}", &DefaultSecretResolver).unwrap();
        assert_eq!(resolved, "v2");
    }

    #[test]
    fn unclosed_placeholder_is_invalid_input() {
        let err = resolve_placeholders("${unterminated", &DefaultSecretResolver).unwrap_err();
        matches!(err, CoreError::InvalidInput(_));
    }
}
