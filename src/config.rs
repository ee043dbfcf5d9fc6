//! Honeypot configuration module
//!
//! Parses the service configuration from a YAML file. Every field has a
//! default, so an empty document (or no file at all) yields the stock
//! deployment: port 22, one permit every 20 seconds, burst of 5, 2 second
//! hold on throttled sessions, logging to stderr.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::network::limiter::{DEFAULT_BURST, DEFAULT_RATE};

/// Main honeypot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoneypotConfig {
    // ============================================
    // Listener
    // ============================================
    /// Address to bind the listener on
    #[serde(default = "default_bind_ip")]
    pub bind_ip: String,

    /// Remote-shell port (privileged by default)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    // ============================================
    // Rate limiting
    // ============================================
    /// Sustained permits per second for each origin
    #[serde(default = "default_rate_per_sec")]
    pub rate_per_sec: f64,

    /// Permits available to a fresh origin
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// How long a throttled session is held open before closing
    #[serde(default = "default_throttle_delay_secs")]
    pub throttle_delay_secs: u64,

    // ============================================
    // Logging
    // ============================================
    /// Append events to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_bind_ip() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    22
}

fn default_rate_per_sec() -> f64 {
    DEFAULT_RATE
}

fn default_burst() -> u32 {
    DEFAULT_BURST
}

fn default_throttle_delay_secs() -> u64 {
    2
}

impl Default for HoneypotConfig {
    fn default() -> Self {
        Self {
            bind_ip: default_bind_ip(),
            bind_port: default_bind_port(),
            rate_per_sec: default_rate_per_sec(),
            burst: default_burst(),
            throttle_delay_secs: default_throttle_delay_secs(),
            log_file: None,
        }
    }
}

impl HoneypotConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: HoneypotConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML in {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn from_str(contents: &str) -> Result<Self> {
        let config: HoneypotConfig = serde_yaml::from_str(contents)
            .context("Failed to parse YAML")?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.bind_ip.is_empty(), "bind_ip cannot be empty");
        anyhow::ensure!(
            self.rate_per_sec.is_finite() && self.rate_per_sec > 0.0,
            "rate_per_sec must be a positive number, got {}",
            self.rate_per_sec
        );
        anyhow::ensure!(self.burst >= 1, "burst must be at least 1");
        if let Some(path) = &self.log_file {
            anyhow::ensure!(!path.is_empty(), "log_file cannot be empty when set");
        }

        Ok(())
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(&self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write config to {}", path.as_ref().display()))?;

        Ok(())
    }

    /// `ip:port` string for the listener
    pub fn bind_addr(&self) -> String {
        if self.bind_ip.contains(':') {
            format!("[{}]:{}", self.bind_ip, self.bind_port)
        } else {
            format!("{}:{}", self.bind_ip, self.bind_port)
        }
    }

    pub fn throttle_delay(&self) -> Duration {
        Duration::from_secs(self.throttle_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = HoneypotConfig::from_str("{}").unwrap();
        assert_eq!(config, HoneypotConfig::default());
        assert_eq!(config.bind_port, 22);
        assert_eq!(config.burst, 5);
        assert!((config.rate_per_sec - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.throttle_delay(), Duration::from_secs(2));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_bind_addr() {
        let config = HoneypotConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:22");

        let config = HoneypotConfig::from_str("bind_ip: \"::\"\nbind_port: 2222\n").unwrap();
        assert_eq!(config.bind_addr(), "[::]:2222");
    }

    #[test]
    fn test_full_config() {
        let config_str = r#"
# Decoy listener
bind_ip: "127.0.0.1"
bind_port: 2222
rate_per_sec: 0.1
burst: 3
throttle_delay_secs: 5
log_file: "/var/log/honeypot.log"
"#;

        let config = HoneypotConfig::from_str(config_str).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:2222");
        assert_eq!(config.burst, 3);
        assert_eq!(config.throttle_delay(), Duration::from_secs(5));
        assert_eq!(config.log_file.as_deref(), Some("/var/log/honeypot.log"));
    }

    #[test]
    fn test_invalid_yaml() {
        let result = HoneypotConfig::from_str("bind_ip: [this is not valid yaml\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_type() {
        let result = HoneypotConfig::from_str("bind_port: \"not_a_number\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_zero_burst() {
        let result = HoneypotConfig::from_str("burst: 0\n");
        let err_msg = format!("{}", result.unwrap_err());
        assert!(err_msg.contains("burst"));
    }

    #[test]
    fn test_validation_rate() {
        assert!(HoneypotConfig::from_str("rate_per_sec: 0\n").is_err());
        assert!(HoneypotConfig::from_str("rate_per_sec: -1.5\n").is_err());
        assert!(HoneypotConfig::from_str("rate_per_sec: .nan\n").is_err());
    }

    #[test]
    fn test_validation_empty_bind_ip() {
        let err_msg = format!("{}", HoneypotConfig::from_str("bind_ip: \"\"\n").unwrap_err());
        assert!(err_msg.contains("bind_ip"));
    }

    #[test]
    fn test_save_and_load() {
        let mut config = HoneypotConfig::default();
        config.bind_port = 2022;
        config.log_file = Some("/tmp/honeypot-test.log".to_string());

        let temp_file = std::env::temp_dir().join("test_save_honeypot_config.yaml");
        config.save(&temp_file).unwrap();
        let loaded = HoneypotConfig::from_file(&temp_file).unwrap();
        assert_eq!(config, loaded);

        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = HoneypotConfig::from_file("/nonexistent/honeypot.yaml").unwrap_err();
        assert!(format!("{err}").contains("Failed to read config file"));
    }
}
