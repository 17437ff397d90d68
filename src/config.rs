//! Service configuration
//!
//! Loaded from a YAML file, with the backend session token overridable via
//! `BASINVIEW_BACKEND_TOKEN` so credentials stay out of checked-in config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub map: MapConfig,
    /// Planet basemap API key; `PLANET_API_KEY` wins over this field
    #[serde(default)]
    pub planet_api_key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the expression-evaluation gateway
    pub base_url: String,
    /// Bearer session token; `BASINVIEW_BACKEND_TOKEN` wins over this field
    #[serde(default)]
    pub token: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Default map view shared by pages that do not recenter on an ROI.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MapConfig {
    #[serde(default = "default_lat")]
    pub center_lat: f64,
    #[serde(default = "default_lon")]
    pub center_lon: f64,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_port() -> u16 {
    3000
}

fn default_lat() -> f64 {
    40.0
}

fn default_lon() -> f64 {
    -100.0
}

fn default_zoom() -> u8 {
    4
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9090".to_string(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_origin: None,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: default_lat(),
            center_lon: default_lon(),
            zoom: default_zoom(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            server: ServerConfig::default(),
            map: MapConfig::default(),
            planet_api_key: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let mut config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;
        if let Ok(token) = std::env::var("BASINVIEW_BACKEND_TOKEN") {
            config.backend.token = Some(token);
        }
        if let Ok(key) = std::env::var("PLANET_API_KEY") {
            config.planet_api_key = Some(key);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.map.zoom, 4);
        assert!(config.backend.token.is_none());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config =
            serde_yaml::from_str("backend:\n  base_url: https://eo.example.com/v1\n").unwrap();
        assert_eq!(config.backend.base_url, "https://eo.example.com/v1");
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.server.port, 3000);
    }
}
