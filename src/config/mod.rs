// Configuration module entry point
// Loads layered configuration, resolves serving roots and builds shared state

pub mod cli;
pub mod roots;
mod state;
mod types;

use std::net::SocketAddr;

pub use roots::ServingRoot;
pub use state::AppState;
pub use types::{
    Config, HttpConfig, LoggingConfig, MimeConfig, PerformanceConfig, ServerConfig,
};

/// Default config file name (without extension), looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gateway";

/// Prefix for environment overrides, e.g. `GATEWAY_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "GATEWAY";

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// Layers, lowest priority first: built-in defaults, the optional file,
    /// then `GATEWAY_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.strict_roots", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 300)?
            .set_default("http.server_name", "static-gateway")?
            .set_default("mime.wasm_override", true)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        let host = self.server.host.trim_start_matches('[').trim_end_matches(']');
        let ip: std::net::IpAddr = host
            .parse()
            .map_err(|e| format!("Invalid address '{}': {e}", self.server.host))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
