//! Provider connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default Prism Central port
pub const DEFAULT_PORT: u16 = 9440;

/// Default per-request timeout in seconds
pub const DEFAULT_WAIT_TIMEOUT: u64 = 60;

/// Connection settings for a Prism Central endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Prism Central host name or address
    pub endpoint: String,

    /// Prism Central port
    pub port: u16,

    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,

    /// Accept self-signed certificates
    pub insecure: bool,

    /// Request timeout in seconds
    pub wait_timeout: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            insecure: false,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl ProviderConfig {
    /// Fill unset fields from `NUTANIX_*` environment variables
    pub fn apply_env(&mut self) {
        if self.endpoint.is_empty() {
            if let Ok(v) = std::env::var("NUTANIX_ENDPOINT") {
                self.endpoint = v;
            }
        }
        if self.username.is_empty() {
            if let Ok(v) = std::env::var("NUTANIX_USERNAME") {
                self.username = v;
            }
        }
        if self.password.is_empty() {
            if let Ok(v) = std::env::var("NUTANIX_PASSWORD") {
                self.password = v;
            }
        }
        if self.port == DEFAULT_PORT {
            if let Some(port) = std::env::var("NUTANIX_PORT").ok().and_then(|v| v.parse().ok()) {
                self.port = port;
            }
        }
        if !self.insecure {
            self.insecure = std::env::var("NUTANIX_INSECURE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "True"))
                .unwrap_or(false);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "endpoint must be set (or NUTANIX_ENDPOINT)".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(Error::InvalidConfig("port must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Base URL of the v3 API
    ///
    /// An endpoint that already carries a scheme is used as-is apart from the port.
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            format!("{}/api/nutanix/v3", endpoint)
        } else {
            format!("https://{}:{}/api/nutanix/v3", endpoint, self.port)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.port, 9440);
        assert_eq!(config.wait_timeout, 60);
        assert!(!config.insecure);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url() {
        let config = ProviderConfig {
            endpoint: "10.0.0.5".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "https://10.0.0.5:9440/api/nutanix/v3");
        assert!(config.validate().is_ok());

        let config = ProviderConfig {
            endpoint: "http://127.0.0.1:8080/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.base_url(), "http://127.0.0.1:8080/api/nutanix/v3");
    }

    #[test]
    fn test_password_not_serialized() {
        let config = ProviderConfig {
            endpoint: "pc.local".to_string(),
            password: "secret".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
