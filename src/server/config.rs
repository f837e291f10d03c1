//! Server configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::server::error::Error;

/// Whether [`start`](crate::server::start) returns once the listener is up or
/// only after the server has terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Background,
    Blocking,
}

/// Adapter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size; also the largest request head accepted.
    pub read_buffer_size: usize,
    /// The largest request body accepted.
    pub max_body_size: usize,
    pub run_mode: RunMode,
    /// Reject unrecognized header and body shapes instead of ignoring them.
    pub strict_translation: bool,
    /// Stop the server on Ctrl+C.
    pub handle_ctrl_c: bool,
    /// How long shutdown waits for in-flight connections.
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits under which no request could ever be served.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_connections == 0 {
            return Err(Error::InvalidConfig("max_connections must be at least 1".to_string()));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::InvalidConfig("read_buffer_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_connections: 1024,
            read_buffer_size: 8192,
            max_body_size: 1024 * 1024,
            run_mode: RunMode::Background,
            strict_translation: false,
            handle_ctrl_c: false,
            shutdown_timeout_secs: 30,
        }
    }
}
