//! Runtime configuration
//!
//! Defaults, optionally replaced by a JSON file named in `FERRUMKV_CONFIG`,
//! then overridden by the individual environment variables.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an optional JSON config file
pub const CONFIG_ENV: &str = "FERRUMKV_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub gateway: GatewayConfig,
}

/// Storage service settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Address the storage service listens on
    pub listen_addr: String,

    /// Initial capacity of the map
    pub initial_capacity: usize,
}

/// Gateway settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Address the HTTP server listens on
    pub listen_addr: String,

    /// Address of the storage service
    pub storage_addr: String,

    /// Timeout for each storage call, in milliseconds
    pub request_timeout_ms: u64,

    /// Idle storage connections kept in the pool
    pub max_idle_connections: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            listen_addr: "0.0.0.0:50051".to_string(),
            initial_capacity: 1024,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            listen_addr: "0.0.0.0:8080".to_string(),
            storage_addr: "localhost:50051".to_string(),
            request_timeout_ms: 5000,
            max_idle_connections: 16,
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Config {
    /// Load the configuration from the process environment
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Config::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Read a JSON config file; missing sections keep their defaults
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply the environment overrides, looked up through `lookup`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(addr) = lookup("KV_LISTEN_ADDR") {
            self.storage.listen_addr = addr;
        }
        if let Some(addr) = lookup("KV_SERVICE_ADDR") {
            self.gateway.storage_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            let port: u16 = port.parse().with_context(|| format!("invalid PORT '{}'", port))?;
            self.gateway.listen_addr = format!("0.0.0.0:{}", port);
        }
        if let Some(ms) = lookup("KV_TIMEOUT_MS") {
            self.gateway.request_timeout_ms =
                ms.parse().with_context(|| format!("invalid KV_TIMEOUT_MS '{}'", ms))?;
        }
        if self.gateway.request_timeout_ms == 0 {
            anyhow::bail!("request timeout must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.listen_addr, "0.0.0.0:50051");
        assert_eq!(config.gateway.storage_addr, "localhost:50051");
        assert_eq!(config.gateway.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("KV_SERVICE_ADDR", "kv-service:50051"),
                ("PORT", "9090"),
                ("KV_TIMEOUT_MS", "250"),
            ]))
            .unwrap();

        assert_eq!(config.gateway.storage_addr, "kv-service:50051");
        assert_eq!(config.gateway.listen_addr, "0.0.0.0:9090");
        assert_eq!(config.gateway.request_timeout(), Duration::from_millis(250));
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        assert!(config.apply_overrides(env(&[("PORT", "eighty")])).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        assert!(config.apply_overrides(env(&[("KV_TIMEOUT_MS", "0")])).is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: Config = serde_json::from_str(r#"{"gateway": {"request_timeout_ms": 100}}"#).unwrap();
        assert_eq!(config.gateway.request_timeout_ms, 100);
        assert_eq!(config.gateway.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.storage.initial_capacity, 1024);
    }
}
