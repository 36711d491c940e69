use super::value::ConfigValue;
use crate::error::CoreError;
use crate::loader::sniff_and_parse;
use std::collections::HashMap;
use std::path::Path;

/// Read and flatten one definition file into `values` (reuses the Source
/// Loader's content-sniffing, §4.A).
pub(super) fn load_file_into(
    path: &Path,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), CoreError> {
    let content = std::fs::read_to_string(path)?;
    load_str_into(&content, values)
}

/// Parse and flatten a config document string into `values`.
pub(super) fn load_str_into(
    content: &str,
    values: &mut HashMap<String, ConfigValue>,
) -> Result<(), CoreError> {
    let parsed = sniff_and_parse(content)?;
    flatten_json("", &parsed, values);
    Ok(())
}

/// Flatten a JSON tree into dot-separated keys, storing sequences both as a
/// whole (`ConfigValue::List`) and per-index (`key.0`, `key.1`, ...) for env
/// var override compatibility.
pub(super) fn flatten_json(
    prefix: &str,
    value: &serde_json::Value,
    out: &mut HashMap<String, ConfigValue>,
) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let full_key = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
                flatten_json(&full_key, v, out);
            }
        }
        serde_json::Value::Array(seq) => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), ConfigValue::List(seq.iter().map(ConfigValue::from_json).collect()));
                for (i, item) in seq.iter().enumerate() {
                    flatten_json(&format!("{prefix}.{i}"), item, out);
                }
            }
        }
        leaf => {
            if !prefix.is_empty() {
                out.insert(prefix.to_string(), ConfigValue::from_json(leaf));
            }
        }
    }
}
