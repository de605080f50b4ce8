use crate::ConfigError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled, events are filtered but discarded.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            "off" | "none" => "off".to_owned(),
            _ => trimmed.to_owned(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let directives = Self::normalize_level_directives(&self.level);
        EnvFilter::try_new(&directives)
            .map(|_| ())
            .map_err(|err| ConfigError::Invalid {
                field: "logging.level",
                message: err.to_string(),
            })
    }

    /// Effective filter: the configured directives, with `RUST_LOG` appended
    /// when set.
    pub fn env_filter(&self) -> EnvFilter {
        let config_directives = Self::normalize_level_directives(&self.level);
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let combined = match env_directives {
            Some(env_directives) => format!("{config_directives},{env_directives}"),
            None => config_directives.clone(),
        };
        EnvFilter::try_new(combined)
            .or_else(|_| EnvFilter::try_new(config_directives))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    fn make_writer(&self) -> BoxMakeWriter {
        if self.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::sink)
        }
    }
}

/// Install the global tracing subscriber.
///
/// Only the first call installs anything; later calls return whether that
/// first installation succeeded (it fails if another subscriber was already
/// set by the host process).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    static INSTALLED: OnceLock<bool> = OnceLock::new();
    *INSTALLED.get_or_init(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(config.env_filter())
            .with_writer(config.make_writer());
        let result = if config.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        match result {
            Ok(()) => {
                tracing::debug!(target: "hylog.config", level = %config.level, "tracing initialized");
                true
            }
            Err(_) => false,
        }
    })
}
