// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub mime: MimeConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Fail at startup when a serving root is missing or not a directory
    #[serde(default)]
    pub strict_roots: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `error`, `warn` or `info`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on a connection's lifetime in seconds, 0 disables it
    pub connection_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

/// MIME override configuration
///
/// `wasm_override` selects between the two gateway variants: with it the
/// table maps `wasm` to `application/wasm`, without it `.wasm` falls through
/// to the built-in table. `overrides` adds further entries on top.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MimeConfig {
    #[serde(default = "default_wasm_override")]
    pub wasm_override: bool,
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_wasm_override() -> bool {
    true
}

impl Default for MimeConfig {
    fn default() -> Self {
        Self {
            wasm_override: default_wasm_override(),
            overrides: HashMap::new(),
        }
    }
}
