//! TOML file configuration structures.
//!
//! These structs directly map to the `gridpool-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    pub session: SessionSection,
    #[serde(default)]
    pub sweep: SweepSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Session configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    /// HMAC secret shared with the identity layer that issues session
    /// tokens. Must be at least 32 bytes.
    pub secret: String,
}

/// Auto-lock sweep configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Seconds between sweep passes over overdue pools.
    #[serde(default = "default_sweep_interval")]
    pub interval_secs: u64,
    /// Bearer secret for `POST /internal/sweep`. The endpoint rejects
    /// every request while this is unset.
    #[serde(default)]
    pub secret: Option<String>,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval(),
            secret: None,
        }
    }
}

fn default_sweep_interval() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[session]
secret = "0123456789abcdef0123456789abcdef"

[sweep]
interval_secs = 30
secret = "cron-secret"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.session.secret.len(), 32);
        assert_eq!(config.sweep.interval_secs, 30);
        assert_eq!(config.sweep.secret.as_deref(), Some("cron-secret"));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let toml_str = r#"
[session]
secret = "0123456789abcdef0123456789abcdef"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.sweep.interval_secs, 60);
        assert!(config.sweep.secret.is_none());
    }

    #[test]
    fn test_missing_session_section_rejected() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"
"#;
        assert!(toml::from_str::<FileConfig>(toml_str).is_err());
    }
}
