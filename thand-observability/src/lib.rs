//! Logging bootstrap (§2.1, §6): wires `tracing-subscriber`'s `EnvFilter`
//! plus a formatting layer from `THAND_LOGGING_{LEVEL,FORMAT,OUTPUT}`,
//! mirroring `r2e-core`'s own `tracing` setup in `config/loader.rs` and
//! `plugin.rs` rather than the optional `r2e-observability` crate's full
//! OpenTelemetry pipeline, which this core carries no use for (DESIGN.md).

use thand_core::config::sections::LoggingSection;
use tracing_subscriber::{fmt, EnvFilter};

/// `logging.format` (§3.1): plain human-readable lines, or one JSON object
/// per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// `logging.output` (§3.1): which stream formatted events are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
}

impl LogOutput {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("stderr") {
            LogOutput::Stderr
        } else {
            LogOutput::Stdout
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl LoggingConfig {
    /// Reads `THAND_LOGGING_LEVEL`/`THAND_LOGGING_FORMAT`/`THAND_LOGGING_OUTPUT`,
    /// falling back to `info`/pretty/stdout when unset.
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("THAND_LOGGING_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: std::env::var("THAND_LOGGING_FORMAT").map(|v| LogFormat::parse(&v)).unwrap_or_default(),
            output: std::env::var("THAND_LOGGING_OUTPUT").map(|v| LogOutput::parse(&v)).unwrap_or_default(),
        }
    }

    /// Builds from the Config Root's typed `logging` section (§3.1),
    /// letting the process configuration document override the env-only
    /// defaults `from_env` falls back to.
    pub fn from_section(section: &LoggingSection) -> Self {
        Self {
            level: section.level.clone(),
            format: LogFormat::parse(&section.format),
            output: LogOutput::parse(&section.output),
        }
    }
}

/// Installs the process-wide `tracing` subscriber. Idempotent-safe to call
/// once at process start; a second call is a caller error (matches
/// `tracing_subscriber`'s own `set_global_default` semantics) and is
/// reported rather than panicking.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt::Subscriber::builder().with_env_filter(env_filter).with_target(true);

    let result = match (config.format, config.output) {
        (LogFormat::Json, LogOutput::Stdout) => builder.json().with_writer(std::io::stdout).try_init(),
        (LogFormat::Json, LogOutput::Stderr) => builder.json().with_writer(std::io::stderr).try_init(),
        (LogFormat::Pretty, LogOutput::Stdout) => builder.with_writer(std::io::stdout).try_init(),
        (LogFormat::Pretty, LogOutput::Stderr) => builder.with_writer(std::io::stderr).try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already initialized: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parse_is_case_insensitive() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
    }

    #[test]
    fn log_output_parse_is_case_insensitive() {
        assert_eq!(LogOutput::parse("STDERR"), LogOutput::Stderr);
        assert_eq!(LogOutput::parse("stdout"), LogOutput::Stdout);
    }

    #[test]
    fn from_section_maps_process_config_fields() {
        let section = LoggingSection { level: "debug".to_string(), format: "json".to_string(), output: "stderr".to_string() };
        let config = LoggingConfig::from_section(&section);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
    }
}
