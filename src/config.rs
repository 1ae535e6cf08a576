//! Process configuration
//!
//! Loaded from environment variables (optionally via a .env file), validated
//! at startup. The network registry has its own loader in `networks.rs`.

use eyre::{eyre, Result, WrapErr};
use std::env;
use std::fmt;
use std::path::Path;

/// Main configuration for the relayer process
#[derive(Clone)]
pub struct Config {
    /// Relayer signing key (0x + 64 hex chars)
    pub private_key: String,
    /// Path of the claim store backing file
    pub claims_file: String,
    /// Directory for the per-chain append-only log files
    pub log_dir: String,
    /// Fixed backoff before a reconnect attempt
    pub reconnect_delay_ms: u64,
    /// Port for the health/metrics endpoint
    pub api_port: u16,
}

/// Custom Debug that redacts the private key to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("private_key", &"<redacted>")
            .field("claims_file", &self.claims_file)
            .field("log_dir", &self.log_dir)
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .field("api_port", &self.api_port)
            .finish()
    }
}

fn default_claims_file() -> String {
    "claims.json".to_string()
}

fn default_log_dir() -> String {
    ".".to_string()
}

fn default_reconnect_delay() -> u64 {
    5000
}

fn default_api_port() -> u16 {
    9090
}

impl Config {
    /// Load configuration from environment variables
    /// Loads .env file if present, then reads from environment
    pub fn load() -> Result<Self> {
        Self::load_from_file(".env").or_else(|_| Self::load_from_env())
    }

    /// Load from a specific .env file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            dotenvy::from_filename(path)
                .wrap_err_with(|| format!("Failed to load .env file from {}", path))?;
        }
        Self::load_from_env()
    }

    /// Load configuration from environment variables
    fn load_from_env() -> Result<Self> {
        let config = Config {
            private_key: env::var("RELAYER_PRIVATE_KEY")
                .map_err(|_| eyre!("RELAYER_PRIVATE_KEY environment variable is required"))?,
            claims_file: env::var("CLAIMS_FILE").unwrap_or_else(|_| default_claims_file()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| default_log_dir()),
            reconnect_delay_ms: env::var("RECONNECT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_reconnect_delay),
            api_port: env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_api_port),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.private_key.len() != 66 || !self.private_key.starts_with("0x") {
            return Err(eyre!(
                "RELAYER_PRIVATE_KEY must be 66 chars (0x + 64 hex chars)"
            ));
        }

        if self.claims_file.is_empty() {
            return Err(eyre!("CLAIMS_FILE cannot be empty"));
        }

        if self.reconnect_delay_ms == 0 {
            return Err(eyre!("RECONNECT_DELAY_MS must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            private_key:
                "0x0000000000000000000000000000000000000000000000000000000000000001".to_string(),
            claims_file: "claims.json".to_string(),
            log_dir: ".".to_string(),
            reconnect_delay_ms: 5000,
            api_port: 9090,
        }
    }

    #[test]
    fn test_default_reconnect_delay() {
        assert_eq!(default_reconnect_delay(), 5000);
    }

    #[test]
    fn test_default_claims_file() {
        assert_eq!(default_claims_file(), "claims.json");
    }

    #[test]
    fn test_private_key_validation() {
        let mut config = valid_config();
        assert!(config.validate().is_ok());

        config.private_key = "0x123".to_string();
        assert!(config.validate().is_err());

        config.private_key = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
            .to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_reconnect_delay_rejected() {
        let mut config = valid_config();
        config.reconnect_delay_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let rendered = format!("{:?}", valid_config());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("000000000000000000000001"));
    }
}
