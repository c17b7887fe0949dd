//! YAML service configuration with environment overrides.
//!
//! Every section and field is optional:
//!
//! ```yaml
//! http:
//!   addr: "0.0.0.0:8080"
//!   max_body_bytes: 1048576
//!   strict_json: false
//! cors:
//!   allow_origin: "*"
//!   allow_methods: [GET, POST, PUT, PATCH, DELETE, OPTIONS]
//!   allow_headers: [Content-Type, Authorization]
//! runtime:
//!   stack_size: 32768
//! log:
//!   level: info
//!   format: pretty
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::dispatcher::BodyPolicy;
use crate::middleware::CorsConfig;
use crate::otel::{LogConfig, LogFormat};
use crate::runtime_config::{parse_size, RuntimeConfig, STACK_SIZE_ENV};

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Failure to load the config file.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_yaml::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub cors: CorsConfig,
    pub runtime: RuntimeSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub addr: String,
    pub max_body_bytes: Option<usize>,
    pub strict_json: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_body_bytes: None,
            strict_json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeSection {
    pub stack_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSection {
    pub level: Option<String>,
    pub format: Option<String>,
    /// Extra `EnvFilter` directives, comma separated.
    pub filter: Option<String>,
    pub non_blocking: bool,
}

impl AppConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_yaml` error for malformed documents.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as null; treat it as all defaults.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Read and parse a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] when the file cannot be read, [`ConfigError::Parse`]
    /// when it is not a valid config document.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `DISHPATCH_*` environment overrides.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("DISHPATCH_ADDR") {
            self.http.addr = addr;
        }
        if let Some(size) = lookup(STACK_SIZE_ENV).and_then(|v| parse_size(&v)) {
            self.runtime.stack_size = Some(size);
        }
        if let Some(level) = lookup("DISHPATCH_LOG_LEVEL") {
            self.log.level = Some(level);
        }
        if let Some(format) = lookup("DISHPATCH_LOG_FORMAT") {
            self.log.format = Some(format);
        }
    }

    #[must_use]
    pub fn body_policy(&self) -> BodyPolicy {
        BodyPolicy {
            max_body_bytes: self.http.max_body_bytes,
            strict_json: self.http.strict_json,
        }
    }

    #[must_use]
    pub fn runtime_config(&self) -> RuntimeConfig {
        self.runtime
            .stack_size
            .map(|stack_size| RuntimeConfig { stack_size })
            .unwrap_or_default()
    }

    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.log.level.clone().unwrap_or_else(|| "info".to_string()),
            format: self
                .log
                .format
                .as_deref()
                .map(LogFormat::parse)
                .unwrap_or(LogFormat::Pretty),
            target_filter: self.log.filter.clone(),
            non_blocking: self.log.non_blocking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_document_is_default() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.http.addr, DEFAULT_ADDR);
        assert_eq!(config.body_policy(), BodyPolicy::default());
        assert_eq!(config.runtime_config(), RuntimeConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = AppConfig::from_yaml(
            "http:\n  max_body_bytes: 1024\n  strict_json: true\nlog:\n  format: json\n",
        )
        .unwrap();
        assert_eq!(config.http.addr, DEFAULT_ADDR);
        assert_eq!(
            config.body_policy(),
            BodyPolicy {
                max_body_bytes: Some(1024),
                strict_json: true
            }
        );
        assert_eq!(config.log_config().format, LogFormat::Json);
        assert_eq!(config.log_config().level, "info");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("DISHPATCH_ADDR", "127.0.0.1:9000"),
            ("DISHPATCH_STACK_SIZE", "0x10000"),
            ("DISHPATCH_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();
        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.http.addr, "127.0.0.1:9000");
        assert_eq!(config.runtime_config().stack_size, 0x10000);
        assert_eq!(config.log_config().level, "debug");
    }
}
