//! Source Loader (§4.A): loads role/workflow/provider definition documents
//! from a filesystem path, an inline string, a URL, or a secret-store key.
//!
//! The content-sniffing and directory-walk primitives here are also reused
//! by `config::loader` for the process configuration document (§3.1), since
//! both need identical "detect JSON vs YAML, walk a directory of definition
//! files" behavior.

pub mod fetch;

use crate::error::CoreError;
use std::path::{Path, PathBuf};

pub use fetch::{SecretFetcher, UrlFetcher};

/// The kind of definition document a `SourceSpec` resolves to (§9
/// "Polymorphism over definition kinds").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Role,
    Workflow,
    Provider,
}

/// A resolved definition document: the kind it belongs to, the raw parsed
/// JSON body, and (for file-backed documents) the originating path, used
/// only for diagnostics/ordering.
#[derive(Debug, Clone)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub body: serde_json::Value,
    pub origin: Option<PathBuf>,
}

/// The possible external sources for one `roles`/`workflows`/`providers`
/// config section (§6): `path`, `url`, `vault`, plus inline `definitions`.
#[derive(Debug, Clone, Default)]
pub struct SourceSpec {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub inline: Option<String>,
    pub secret_key: Option<String>,
}

/// Sniff the content of `body` and parse it to JSON: a leading non-whitespace
/// `{` or `[` means JSON, anything else is parsed as YAML and converted.
/// Empty input (after trimming whitespace) fails with `InvalidInput`.
pub fn sniff_and_parse(body: &str) -> Result<serde_json::Value, CoreError> {
    let first_non_ws = body.chars().find(|c| !c.is_whitespace());
    match first_non_ws {
        None => Err(CoreError::InvalidInput("empty definition document".to_string())),
        Some('{') | Some('[') => {
            serde_json::from_str(body).map_err(|e| CoreError::InvalidInput(e.to_string()))
        }
        Some(_) => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(body).map_err(|e| CoreError::InvalidInput(e.to_string()))?;
            serde_json::to_value(yaml).map_err(|e| CoreError::InvalidInput(e.to_string()))
        }
    }
}

/// List the definition files under `dir`: every `.yaml|.yml|.json` file,
/// in directory order at the top level, walking all subdirectories (§4.A).
/// Other extensions are skipped.
pub fn walk_definition_files(dir: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut out = Vec::new();
    collect_definition_files(dir, &mut out)?;
    out.sort();
    Ok(out)
}

fn collect_definition_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), CoreError> {
    let entries = std::fs::read_dir(dir)?;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_definition_files(&path, out)?;
        } else if is_definition_extension(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_definition_extension(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}

/// Resolve one `SourceSpec` into zero-or-more parsed definition documents.
///
/// Resolution priority when multiple are supplied: inline data, then URL,
/// then path; secret-store contents (when `secret_key` is set) are read
/// first into the inline slot (§4.A).
pub async fn resolve(
    kind: DefinitionKind,
    spec: &SourceSpec,
    url_fetcher: Option<&dyn UrlFetcher>,
    secret_fetcher: Option<&dyn SecretFetcher>,
) -> Result<Vec<Definition>, CoreError> {
    let mut inline = spec.inline.clone();

    if inline.is_none() {
        if let Some(secret_key) = &spec.secret_key {
            let fetcher = secret_fetcher
                .ok_or_else(|| CoreError::VaultUnavailable(secret_key.clone()))?;
            inline = Some(fetcher.fetch_secret(secret_key).await?);
        }
    }

    if let Some(body) = inline {
        let parsed = sniff_and_parse(&body)?;
        return Ok(vec![Definition { kind, body: parsed, origin: None }]);
    }

    if let Some(url) = &spec.url {
        let fetcher = url_fetcher.ok_or_else(|| CoreError::InvalidInput(format!(
            "no URL fetcher configured to load {url}"
        )))?;
        let body = fetcher.fetch_url(url).await?;
        let parsed = sniff_and_parse(&body)?;
        return Ok(vec![Definition { kind, body: parsed, origin: None }]);
    }

    if let Some(path) = &spec.path {
        return load_path(kind, path);
    }

    Ok(Vec::new())
}

fn load_path(kind: DefinitionKind, path: &Path) -> Result<Vec<Definition>, CoreError> {
    if path.is_dir() {
        let mut out = Vec::new();
        for file in walk_definition_files(path)? {
            let content = std::fs::read_to_string(&file)?;
            let parsed = sniff_and_parse(&content)?;
            out.push(Definition { kind, body: parsed, origin: Some(file) });
        }
        Ok(out)
    } else {
        let content = std::fs::read_to_string(path)?;
        let parsed = sniff_and_parse(&content)?;
        Ok(vec![Definition { kind, body: parsed, origin: Some(path.to_path_buf()) }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_detects_json_by_leading_brace() {
        let parsed = sniff_and_parse(r#"  {"a": 1}"#).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn sniff_detects_json_array() {
        let parsed = sniff_and_parse(r#"[1, 2, 3]"#).unwrap();
        assert!(parsed.is_array());
    }

    #[test]
    fn sniff_falls_back_to_yaml() {
        let parsed = sniff_and_parse("a: 1\nb: two\n").unwrap();
        assert_eq!(parsed["a"], 1);
        assert_eq!(parsed["b"], "two");
    }

    #[test]
    fn sniff_empty_input_fails() {
        let err = sniff_and_parse("   \n  ").unwrap_err();
        matches!(err, CoreError::InvalidInput(_));
    }

    #[test]
    fn walk_definition_files_filters_extensions_and_recurses() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), "x: 1").unwrap();
        std::fs::write(dir.path().join("b.txt"), "ignored").unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(nested.join("c.json"), "{}").unwrap();

        let files = walk_definition_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with("a.yaml")));
        assert!(files.iter().any(|f| f.ends_with("nested/c.json")));
    }

    #[tokio::test]
    async fn resolve_prefers_inline_over_url_and_path() {
        let spec = SourceSpec {
            inline: Some(r#"{"version":"1.0"}"#.to_string()),
            url: Some("https://example.invalid/roles.json".to_string()),
            path: Some(PathBuf::from("/does/not/exist.json")),
            secret_key: None,
        };
        let defs = resolve(DefinitionKind::Role, &spec, None, None).await.unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].body["version"], "1.0");
    }
}
