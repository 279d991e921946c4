// Configuration module entry point
// Loads host server settings from config.toml and SERVER_* environment variables

mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

impl Config {
    /// Load configuration from the default "config" file (any supported extension)
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.reuse_port", true)?
            .set_default("server.backlog", 1024)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub const fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.read_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-not-a-config-file").unwrap();
        assert_eq!(cfg.http.max_body_size, 10_485_760);
        assert!(cfg.performance.keep_alive);
        assert_eq!(cfg.connection_timeout(), Duration::from_secs(30));
        assert!(cfg.get_socket_addr().is_ok());
        assert!(cfg.logging.access_log_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("typemux-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("server.toml");
        std::fs::write(
            &file,
            "[server]\nhost = \"0.0.0.0\"\nport = 9000\nworkers = 2\n\n[http]\nmax_body_size = 64\n",
        )
        .unwrap();

        let base = dir.join("server");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.http.max_body_size, 64);
        assert_eq!(cfg.get_socket_addr().unwrap().to_string(), "0.0.0.0:9000");
        let _ = std::fs::remove_dir_all(dir);
    }
}
