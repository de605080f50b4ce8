use hylog_memory::{ControllerOptions, MAX_LOG_MEMORY_SIZE_BITS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, LoggingConfig};

/// Environment variable naming a config file for [`HylogConfig::load_from_env`].
pub const HYLOG_CONFIG_ENV_VAR: &str = "HYLOG_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Toml(String),
    #[error("invalid value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message only; the default `Display` embeds a source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

/// A byte size which supports both raw byte counts and human-friendly suffixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[schemars(transparent)]
pub struct ByteSize(pub u64);

impl Serialize for ByteSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ByteSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bytes(u64),
            Human(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bytes(value) => Ok(ByteSize(value)),
            Repr::Human(value) => hylog_memory::parse_byte_size(&value)
                .map(ByteSize)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Memory controller settings (`[memory]`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct MemoryConfig {
    /// The in-memory log window is `2^log_memory_size_bits` bytes.
    #[serde(default = "MemoryConfig::default_log_memory_size_bits")]
    #[schemars(range(max = 62))]
    pub log_memory_size_bits: u8,

    /// Target footprint for index plus log. Unset means unbounded.
    #[serde(default)]
    pub target_bytes: Option<ByteSize>,
}

impl MemoryConfig {
    fn default_log_memory_size_bits() -> u8 {
        25
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            log_memory_size_bits: self.log_memory_size_bits,
            target_size_bytes: self.target_bytes.map(|value| value.0),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log_memory_size_bits > MAX_LOG_MEMORY_SIZE_BITS {
            return Err(ConfigError::Invalid {
                field: "memory.log_memory_size_bits",
                message: format!(
                    "{} exceeds the maximum of {MAX_LOG_MEMORY_SIZE_BITS}",
                    self.log_memory_size_bits
                ),
            });
        }
        if self.target_bytes == Some(ByteSize(0)) {
            return Err(ConfigError::Invalid {
                field: "memory.target_bytes",
                message: "must be greater than zero; omit it for an unbounded target".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            log_memory_size_bits: Self::default_log_memory_size_bits(),
            target_bytes: None,
        }
    }
}

/// Top-level configuration loaded from TOML.
///
/// ```toml
/// [memory]
/// log_memory_size_bits = 25
/// target_bytes = "24MiB"
///
/// [logging]
/// level = "hylog.memory=debug"
/// json = false
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
#[schemars(deny_unknown_fields)]
pub struct HylogConfig {
    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HylogConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: HylogConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by [`HYLOG_CONFIG_ENV_VAR`], if set.
    pub fn load_from_env() -> Result<Option<Self>, ConfigError> {
        match std::env::var_os(HYLOG_CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => {
                tracing::debug!(
                    target: "hylog.config",
                    path = %Path::new(&path).display(),
                    "loading config from environment"
                );
                Self::load_from_path(path).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.memory.validate()?;
        self.logging.validate()
    }
}

/// JSON schema for [`HylogConfig`].
pub fn json_schema() -> schemars::schema::RootSchema {
    static SCHEMA: OnceLock<schemars::schema::RootSchema> = OnceLock::new();
    SCHEMA
        .get_or_init(|| schemars::schema_for!(HylogConfig))
        .clone()
}
