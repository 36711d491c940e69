//! Parses the `{version, roles|workflows|providers: {...}}` document shape
//! (§6) out of a resolved [`thand_core::loader::Definition`] body.

use std::collections::HashMap;
use thand_core::{CoreError, Provider, Role};

pub fn extract_roles(body: &serde_json::Value) -> Result<HashMap<String, Role>, CoreError> {
    extract_section(body, "roles")
}

pub fn extract_providers(body: &serde_json::Value) -> Result<HashMap<String, Provider>, CoreError> {
    extract_section(body, "providers")
}

/// Workflows carry no fixed schema in this core (§9); each entry is kept as
/// opaque JSON and handed to the external workflow engine verbatim.
pub fn extract_workflows(
    body: &serde_json::Value,
) -> Result<HashMap<String, serde_json::Value>, CoreError> {
    extract_section(body, "workflows")
}

fn extract_section<T: serde::de::DeserializeOwned>(
    body: &serde_json::Value,
    key: &str,
) -> Result<HashMap<String, T>, CoreError> {
    match body.get(key) {
        None => Ok(HashMap::new()),
        Some(section) => serde_json::from_value(section.clone())
            .map_err(|e| CoreError::InvalidInput(format!("malformed '{key}' document: {e}"))),
    }
}
