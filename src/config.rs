//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Label allocation configuration
    pub labels: LabelConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Base directory for the persisted world tables
    pub data_dir: String,
}

/// Label allocation configuration
#[derive(Debug, Clone, Copy)]
pub struct LabelConfig {
    /// Smallest label that may be allocated
    pub min: u32,
    /// Largest label that may be allocated
    pub max: u32,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            min: 1000,
            max: 9999,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8765),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            persistence: PersistenceConfig {
                data_dir: env::var("DATA_DIR").unwrap_or_else(|_| {
                    // Default to ~/.turtle-relay or current directory
                    if let Some(home) = env::var_os("HOME") {
                        format!("{}/.turtle-relay", home.to_string_lossy())
                    } else {
                        ".turtle-relay".to_string()
                    }
                }),
            },
            labels: LabelConfig {
                min: env::var("LABEL_MIN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
                max: env::var("LABEL_MAX")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(9999),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
