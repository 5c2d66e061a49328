//! Client configuration

use serde::{Deserialize, Serialize};

/// Configuration for connecting to a remote debugging endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Host the endpoint listens on
    pub host: String,

    /// Port the endpoint listens on
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9222,
        }
    }
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Base URL of the endpoint's HTTP metadata surface
    pub fn http_base(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}
