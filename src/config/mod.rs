// Configuration module entry point
// Loads layered settings and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HealthConfig, HttpConfig, KochConfig, LoggingConfig, PerformanceConfig,
    RoutesConfig, ServerConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Upper bound for `koch.max_order`; a half-right curve at this order has
/// 2 * 4^10 + 1 points and serializes to roughly 80 MB of JSON
pub const MAX_SUPPORTED_ORDER: u32 = 10;

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional. Environment variables such as
    /// `KOCH_SERVER__PORT=8080` or `KOCH_KOCH__MAX_ORDER=8` override it.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("KOCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "koch-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("koch.scale", 10.0)?
            .set_default("koch.default_order", 3)?
            .set_default("koch.max_order", 10)?
            .set_default("koch.enable_snowflake", false)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the fractal endpoint cannot serve
    fn validate(&self) -> Result<(), config::ConfigError> {
        let koch = &self.koch;
        if !koch.scale.is_finite() || koch.scale <= 0.0 {
            return Err(config::ConfigError::Message(format!(
                "koch.scale must be a positive number, got {}",
                koch.scale
            )));
        }
        if koch.max_order > MAX_SUPPORTED_ORDER {
            return Err(config::ConfigError::Message(format!(
                "koch.max_order ({}) exceeds the supported limit of {MAX_SUPPORTED_ORDER}",
                koch.max_order
            )));
        }
        if koch.default_order > koch.max_order {
            return Err(config::ConfigError::Message(format!(
                "koch.default_order ({}) exceeds koch.max_order ({})",
                koch.default_order, koch.max_order
            )));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.koch, KochConfig::default());
        assert!(cfg.routes.health.enabled);
        assert!(cfg.routes.static_dir.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_bad_koch_settings() {
        let mut cfg = Config::load_from("no-such-config-file").unwrap();
        cfg.koch.default_order = 12;
        assert!(cfg.validate().is_err());
        cfg.koch.default_order = 3;
        cfg.koch.scale = 0.0;
        assert!(cfg.validate().is_err());
        cfg.koch.scale = 10.0;
        cfg.koch.max_order = MAX_SUPPORTED_ORDER + 1;
        assert!(cfg.validate().is_err());
        cfg.koch.max_order = MAX_SUPPORTED_ORDER;
        assert!(cfg.validate().is_ok());
    }
}
