//! Typed process-configuration sections (§3.1): one struct per top-level
//! document key, each implementing `ConfigSection` so it can be reached via
//! `ThandConfig<T>`'s `Deref`. Grounded on `r2e-core::config::typed`'s
//! `ConfigProperties` (prefix + `from_config`), simplified to this crate's
//! own `ConfigSection` trait rather than the teacher's derive macro, since
//! the section set here is small and fixed.

use std::collections::HashMap;

use crate::error::CoreError;

use super::value::{ConfigValue, FromConfigValue};
use super::{ConfigSection, ThandConfig};

/// `environment: {platform, config}` (§3.1) — cloud credentials, read from
/// `environment.config.*` / `THAND_ENVIRONMENT_CONFIG_*`.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSection {
    pub platform: Option<String>,
    pub config: HashMap<String, String>,
}

impl ConfigSection for EnvironmentSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        let platform = config.get("environment.platform").ok();
        let config_map = string_map(config, "environment.config");
        Ok(EnvironmentSection { platform, config: config_map })
    }
}

/// One external collaborator endpoint (`services.llm`/`services.temporal`).
#[derive(Debug, Clone, Default)]
pub struct ServiceEndpoint {
    pub url: Option<String>,
    pub api_key: Option<String>,
}

impl ServiceEndpoint {
    fn load(config: &ThandConfig, prefix: &str) -> Self {
        ServiceEndpoint {
            url: config.get(&format!("{prefix}.url")).ok(),
            api_key: config.get(&format!("{prefix}.api_key")).ok(),
        }
    }
}

/// `services: {llm?, temporal?}` (§3.1) — out of scope to call into; the
/// core only owns and validates the typed shape.
#[derive(Debug, Clone, Default)]
pub struct ServicesSection {
    pub llm: Option<ServiceEndpoint>,
    pub temporal: Option<ServiceEndpoint>,
}

impl ConfigSection for ServicesSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        let llm = config.contains_key("services.llm.url").then(|| ServiceEndpoint::load(config, "services.llm"));
        let temporal = config
            .contains_key("services.temporal.url")
            .then(|| ServiceEndpoint::load(config, "services.temporal"));
        Ok(ServicesSection { llm, temporal })
    }
}

/// `login: {endpoint, base_url}` (§3.1) — targets for `/preflight` and
/// `/register` (§6); the HTTP calls themselves are out of scope here.
#[derive(Debug, Clone, Default)]
pub struct LoginSection {
    pub endpoint: Option<String>,
    pub base_url: Option<String>,
}

impl ConfigSection for LoginSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        Ok(LoginSection {
            endpoint: config.get("login.endpoint").ok(),
            base_url: config.get("login.base_url").ok(),
        })
    }
}

/// `server.rate_limit` (§6): 100 requests per minute, burst of 10, by
/// default.
#[derive(Debug, Clone)]
pub struct RateLimit {
    pub requests_per_minute: i64,
    pub burst: i64,
}

impl Default for RateLimit {
    fn default() -> Self {
        RateLimit { requests_per_minute: 100, burst: 10 }
    }
}

/// `server: {bind_addr, base_path, health_path, ready_path, metrics_path,
/// read_timeout, write_timeout, rate_limit}` (§3.1), defaulted per §6.
#[derive(Debug, Clone)]
pub struct ServerSection {
    pub bind_addr: String,
    pub base_path: String,
    pub health_path: String,
    pub ready_path: String,
    pub metrics_path: String,
    pub read_timeout_secs: i64,
    pub write_timeout_secs: i64,
    pub rate_limit: RateLimit,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            bind_addr: "0.0.0.0:5225".to_string(),
            base_path: "/api/v1".to_string(),
            health_path: "/health".to_string(),
            ready_path: "/ready".to_string(),
            metrics_path: "/metrics".to_string(),
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            rate_limit: RateLimit::default(),
        }
    }
}

impl ConfigSection for ServerSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        let defaults = ServerSection::default();
        Ok(ServerSection {
            bind_addr: config.get_or("server.bind_addr", defaults.bind_addr),
            base_path: config.get_or("server.base_path", defaults.base_path),
            health_path: config.get_or("server.health_path", defaults.health_path),
            ready_path: config.get_or("server.ready_path", defaults.ready_path),
            metrics_path: config.get_or("server.metrics_path", defaults.metrics_path),
            read_timeout_secs: config.get_or("server.read_timeout", defaults.read_timeout_secs),
            write_timeout_secs: config.get_or("server.write_timeout", defaults.write_timeout_secs),
            rate_limit: RateLimit {
                requests_per_minute: config
                    .get_or("server.rate_limit.requests_per_minute", defaults.rate_limit.requests_per_minute),
                burst: config.get_or("server.rate_limit.burst", defaults.rate_limit.burst),
            },
        })
    }
}

/// `logging: {level, format, output}` (§3.1) — consumed by
/// `thand-observability`'s `LoggingConfig::from_section`; kept as raw
/// strings here so this crate doesn't depend on that one.
#[derive(Debug, Clone)]
pub struct LoggingSection {
    pub level: String,
    pub format: String,
    pub output: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection { level: "info".to_string(), format: "pretty".to_string(), output: "stdout".to_string() }
    }
}

impl ConfigSection for LoggingSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        let defaults = LoggingSection::default();
        Ok(LoggingSection {
            level: config.get_or("logging.level", defaults.level),
            format: config.get_or("logging.format", defaults.format),
            output: config.get_or("logging.output", defaults.output),
        })
    }
}

/// `api: {key}` (§3.1) — bearer token for the sync HTTP surface and
/// registration (§6).
#[derive(Debug, Clone, Default)]
pub struct ApiSection {
    pub key: Option<String>,
}

impl ConfigSection for ApiSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        Ok(ApiSection { key: config.get("api.key").ok() })
    }
}

/// `secret.vault` (§3.1) — only the typed shape and the placeholder
/// resolver are in scope; an actual vault client is an external
/// collaborator.
#[derive(Debug, Clone, Default)]
pub struct VaultConfig {
    pub address: Option<String>,
    pub token: Option<String>,
    pub path: Option<String>,
}

/// `secret: {vault?}` (§3.1).
#[derive(Debug, Clone, Default)]
pub struct SecretSection {
    pub vault: Option<VaultConfig>,
}

impl ConfigSection for SecretSection {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        let vault = config.contains_key("secret.vault.address").then(|| VaultConfig {
            address: config.get("secret.vault.address").ok(),
            token: config.get("secret.vault.token").ok(),
            path: config.get("secret.vault.path").ok(),
        });
        Ok(SecretSection { vault })
    }
}

/// `roles/workflows/providers: {path?, url?, vault?, definitions}` (§3.1) —
/// fed to the Source Loader (§4.A). Not a blanket `ConfigSection` impl since
/// the three instances live under different top-level keys; built via
/// [`SourceSection::load`] with that key as the prefix.
#[derive(Debug, Clone, Default)]
pub struct SourceSection {
    pub path: Option<String>,
    pub url: Option<String>,
    pub vault: Option<String>,
    pub definitions: HashMap<String, ConfigValue>,
}

impl SourceSection {
    pub fn load(config: &ThandConfig, section: &str) -> Self {
        SourceSection {
            path: config.get(&format!("{section}.path")).ok(),
            url: config.get(&format!("{section}.url")).ok(),
            vault: config.get(&format!("{section}.vault")).ok(),
            definitions: config.prefixed(&format!("{section}.definitions")),
        }
    }
}

/// The full process configuration document (§3.1/§6), assembled from every
/// top-level section. Build with `ThandConfig::with_typed::<ProcessConfig>()`.
#[derive(Debug, Clone, Default)]
pub struct ProcessConfig {
    pub environment: EnvironmentSection,
    pub services: ServicesSection,
    pub login: LoginSection,
    pub server: ServerSection,
    pub logging: LoggingSection,
    pub api: ApiSection,
    pub secret: SecretSection,
    pub roles: SourceSection,
    pub workflows: SourceSection,
    pub providers: SourceSection,
}

impl ConfigSection for ProcessConfig {
    fn from_config(config: &ThandConfig) -> Result<Self, CoreError> {
        Ok(ProcessConfig {
            environment: EnvironmentSection::from_config(config)?,
            services: ServicesSection::from_config(config)?,
            login: LoginSection::from_config(config)?,
            server: ServerSection::from_config(config)?,
            logging: LoggingSection::from_config(config)?,
            api: ApiSection::from_config(config)?,
            secret: SecretSection::from_config(config)?,
            roles: SourceSection::load(config, "roles"),
            workflows: SourceSection::load(config, "workflows"),
            providers: SourceSection::load(config, "providers"),
        })
    }
}

fn string_map(config: &ThandConfig, prefix: &str) -> HashMap<String, String> {
    config
        .prefixed(prefix)
        .into_iter()
        .filter_map(|(k, v)| String::from_config_value(&v, &k).ok().map(|s| (k, s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_section_uses_defaults_when_unset() {
        let config = ThandConfig::from_str("{}").unwrap();
        let server = ServerSection::from_config(&config).unwrap();
        assert_eq!(server.bind_addr, "0.0.0.0:5225");
        assert_eq!(server.base_path, "/api/v1");
        assert_eq!(server.rate_limit.requests_per_minute, 100);
        assert_eq!(server.rate_limit.burst, 10);
    }

    #[test]
    fn server_section_reads_overrides() {
        let config = ThandConfig::from_str(
            r#"{"server": {"bind_addr": "127.0.0.1:9000", "rate_limit": {"burst": 50}}}"#,
        )
        .unwrap();
        let server = ServerSection::from_config(&config).unwrap();
        assert_eq!(server.bind_addr, "127.0.0.1:9000");
        assert_eq!(server.rate_limit.burst, 50);
        assert_eq!(server.rate_limit.requests_per_minute, 100);
    }

    #[test]
    fn environment_section_collects_config_map() {
        let config = ThandConfig::from_str(
            r#"{"environment": {"platform": "aws", "config": {"region": "us-east-1", "account_id": "123"}}}"#,
        )
        .unwrap();
        let env = EnvironmentSection::from_config(&config).unwrap();
        assert_eq!(env.platform.as_deref(), Some("aws"));
        assert_eq!(env.config.get("region").map(String::as_str), Some("us-east-1"));
        assert_eq!(env.config.get("account_id").map(String::as_str), Some("123"));
    }

    #[test]
    fn source_section_reads_path_url_vault_and_definitions() {
        let config = ThandConfig::from_str(
            r#"{"roles": {"path": "/etc/thand/roles", "definitions": {"admin": {"version": "1.0"}}}}"#,
        )
        .unwrap();
        let roles = SourceSection::load(&config, "roles");
        assert_eq!(roles.path.as_deref(), Some("/etc/thand/roles"));
        assert!(roles.url.is_none());
        assert!(roles.definitions.contains_key("admin.version"));
    }

    #[test]
    fn process_config_assembles_every_section() {
        let config = ThandConfig::from_str(
            r#"{"logging": {"level": "debug"}, "api": {"key": "secret-token"}}"#,
        )
        .unwrap();
        let typed = config.with_typed::<ProcessConfig>().unwrap();
        assert_eq!(typed.logging.level, "debug");
        assert_eq!(typed.api.key.as_deref(), Some("secret-token"));
        assert_eq!(typed.server.bind_addr, "0.0.0.0:5225");
    }
}
