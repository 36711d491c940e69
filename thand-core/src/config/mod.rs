//! Flattened, typed configuration loading for the process-level document
//! described in SPEC_FULL §3.1/§6: dot-separated keys, `${...}` placeholder
//! resolution, environment-variable overlay on the `THAND_*` prefix.
//!
//! Grounded on `r2e-core::config`'s `R2eConfig` — the same flatten + typed
//! `Deref` layering, generalized to the `THAND_` env prefix and to the
//! `roles/workflows/providers` external-source fields this system needs
//! that `r2e-core`'s own config does not.

mod loader;
pub mod secrets;
pub mod sections;
pub mod value;

use crate::error::CoreError;
use std::collections::HashMap;
use std::ops::Deref;
use std::path::Path;

pub use secrets::{DefaultSecretResolver, SecretResolver};
pub use value::{ConfigValue, FromConfigValue};

/// A typed view built from the raw flattened config. Implemented once per
/// top-level document section (`environment`, `server`, `logging`, ...).
pub trait ConfigSection: Sized {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError>;
}

impl ConfigSection for () {
    fn from_config(_config: &ThandConfig) -> Result<Self, CoreError> {
        Ok(())
    }
}

/// Flattened configuration loaded from YAML/JSON documents and the
/// process environment.
///
/// `ThandConfig` (= `ThandConfig<()>`) provides raw key-value access only.
/// `ThandConfig<T>` adds typed section access via `Deref<Target = T>`.
#[derive(Debug, Clone)]
pub struct ThandConfig<T = ()> {
    values: HashMap<String, ConfigValue>,
    typed: T,
}

impl ThandConfig {
    /// Load a document from a path (file or directory of `.yaml|.yml|.json`
    /// files), then resolve `${...}` placeholders and overlay `THAND_*`
    /// environment variables (`.` replaced by `_`, per §6).
    pub fn load_with_resolver(path: &Path, resolver: &dyn SecretResolver) -> Result<Self, CoreError> {
        let mut values = HashMap::new();
        if path.is_dir() {
            for entry in loader::walk_definition_files(path)? {
                loader::load_file_into(&entry, &mut values)?;
            }
        } else if path.exists() {
            loader::load_file_into(path, &mut values)?;
        }

        let _ = dotenvy::dotenv();
        resolve_string_values(&mut values, resolver)?;
        overlay_environment(&mut values);

        Ok(ThandConfig { values, typed: () })
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        Self::load_with_resolver(path, &DefaultSecretResolver)
    }

    /// Build a config directly from an in-memory string (YAML or JSON,
    /// detected by first non-whitespace byte — useful for tests).
    pub fn from_str(content: &str) -> Result<Self, CoreError> {
        let mut values = HashMap::new();
        loader::load_str_into(content, &mut values)?;
        overlay_environment(&mut values);
        Ok(ThandConfig { values, typed: () })
    }

    pub fn empty() -> Self {
        ThandConfig { values: HashMap::new(), typed: () }
    }

    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Upgrade to a typed config by constructing `C` from the raw values.
    pub fn with_typed<C: ConfigSection>(self) -> Result<ThandConfig<C>, CoreError> {
        let typed = C::from_config(&self)?;
        Ok(ThandConfig { values: self.values, typed })
    }
}

impl<T> ThandConfig<T> {
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, CoreError> {
        let value = self.values.get(key).ok_or_else(|| CoreError::ConfigNotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Every flattened entry whose key starts with `"{prefix}."`, keyed by
    /// the remainder with that prefix stripped. Used by a section to read
    /// an arbitrary nested map (`environment.config.*`,
    /// `roles.definitions.*`, ...) without knowing its field names ahead of
    /// time.
    pub fn prefixed(&self, prefix: &str) -> HashMap<String, ConfigValue> {
        let dotted = format!("{prefix}.");
        self.values
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(&dotted).map(|rest| (rest.to_string(), v.clone())))
            .collect()
    }

    pub fn typed(&self) -> &T {
        &self.typed
    }

    pub fn raw(&self) -> ThandConfig {
        ThandConfig { values: self.values.clone(), typed: () }
    }
}

impl<T> Deref for ThandConfig<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.typed
    }
}

fn resolve_string_values(
    values: &mut HashMap<String, ConfigValue>,
    resolver: &dyn SecretResolver,
) -> Result<(), CoreError> {
    let keys: Vec<String> = values.keys().cloned().collect();
    for key in keys {
        if let Some(ConfigValue::String(s)) = values.get(&key) {
            if s.contains("${") {
                let resolved = secrets::resolve_placeholders(s, resolver)?;
                values.insert(key, ConfigValue::String(resolved));
            }
        }
    }
    Ok(())
}

/// Overlay `THAND_*` environment variables onto the flattened map.
/// Convention: `THAND_LOGGING_LEVEL` <-> `logging.level`.
fn overlay_environment(values: &mut HashMap<String, ConfigValue>) {
    for (env_key, env_val) in std::env::vars() {
        let Some(rest) = env_key.strip_prefix("THAND_") else { continue };
        let config_key = rest.to_lowercase().replace('_', ".");
        values.insert(config_key, ConfigValue::String(env_val));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_detects_json_by_leading_brace() {
        let cfg = ThandConfig::from_str(r#"{"server": {"bind_addr": "0.0.0.0:5225"}}"#).unwrap();
        let addr: String = cfg.get("server.bind_addr").unwrap();
        assert_eq!(addr, "0.0.0.0:5225");
    }

    #[test]
    fn from_str_parses_yaml_when_not_json() {
        let cfg = ThandConfig::from_str("server:\n  bind_addr: \"0.0.0.0:5225\"\n").unwrap();
        let addr: String = cfg.get("server.bind_addr").unwrap();
        assert_eq!(addr, "0.0.0.0:5225");
    }

    #[test]
    fn env_overlay_uses_thand_prefix() {
        std::env::set_var("THAND_LOGGING_LEVEL", "debug");
        let cfg = ThandConfig::from_str("{}").unwrap();
        let level: String = cfg.get("logging.level").unwrap();
        assert_eq!(level, "debug");
    }
}
