//! Configuration types for the HAL client.

use serde::{Deserialize, Serialize};

/// Main configuration for the HAL client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Configuration version
    pub version: String,
    /// Transport settings
    pub transport: TransportSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            transport: TransportSettings::default(),
        }
    }
}

/// HTTP transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Base URL relative hrefs are resolved against
    pub base_url: Option<String>,
    /// Request timeout (ms)
    pub timeout_ms: u64,
    /// Accept header sent with every request
    pub accept: String,
    /// User-Agent header
    pub user_agent: Option<String>,
    /// Additional headers sent with every request
    pub headers: Vec<HeaderValue>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 30_000,
            accept: "application/hal+json".to_string(),
            user_agent: None,
            headers: vec![],
        }
    }
}

/// Header name-value pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderValue {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}
