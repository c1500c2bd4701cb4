//! Configuration module for gridpool-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments, and
//! environment variables. The sweep section can be reloaded via SIGHUP;
//! the listen address and session secret are fixed for the process
//! lifetime.

pub mod file;

use crate::config::file::{FileConfig, SweepSection};
use gridpool_sdk::token::MIN_KEY_LEN;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Database URL used when `GRIDPOOL_DB` is unset.
const DEFAULT_DATABASE_URL: &str = "sqlite://gridpool.db";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub session_secret: String,
    pub sweep: SweepSection,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig {
            sweep: Arc::new(RwLock::new(self.sweep)),
        }
    }
}

/// The reloadable slice of configuration shared with request handlers.
#[derive(Clone)]
pub struct SharedConfig {
    pub sweep: Arc<RwLock<SweepSection>>,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            session_secret: file_config.session.secret,
            sweep: file_config.sweep,
        })
    }

    /// Reload the configuration (used during SIGHUP).
    ///
    /// Returns a LoadedConfig whose sweep section can be swapped into a
    /// SharedConfig.
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.session.secret.len() < MIN_KEY_LEN {
        return Err(ConfigError::ValidationError(format!(
            "session secret must be at least {MIN_KEY_LEN} bytes, got {}",
            config.session.secret.len()
        )));
    }
    if config.sweep.interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "sweep interval_secs must be at least 1".to_string(),
        ));
    }
    if let Some(secret) = &config.sweep.secret {
        if secret.is_empty() {
            return Err(ConfigError::ValidationError(
                "sweep secret must not be empty when set".to_string(),
            ));
        }
    }
    Ok(())
}

/// Get the database URL from the environment, with a local file default.
pub fn get_database_url() -> String {
    std::env::var("GRIDPOOL_DB").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_valid_config_passes_validation() {
        let config = parse(
            r#"
[session]
secret = "0123456789abcdef0123456789abcdef"
"#,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_short_session_secret_rejected() {
        let config = parse(
            r#"
[session]
secret = "too-short"
"#,
        );
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let config = parse(
            r#"
[session]
secret = "0123456789abcdef0123456789abcdef"

[sweep]
interval_secs = 0
"#,
        );
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("interval_secs"));
    }

    #[test]
    fn test_empty_sweep_secret_rejected() {
        let config = parse(
            r#"
[session]
secret = "0123456789abcdef0123456789abcdef"

[sweep]
secret = ""
"#,
        );
        assert!(validate(&config).is_err());
    }
}
