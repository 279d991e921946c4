// Configuration types module
// Settings for the host server that serves a mux

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads; defaults to the number of CPU cores
    pub workers: Option<usize>,
    pub reuse_port: bool,
    pub backlog: i32,
}

/// Request limits
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Largest accepted request body, in bytes
    pub max_body_size: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
}

/// Connection handling
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a connection may stay open before it is dropped
    pub read_timeout: u64,
}
