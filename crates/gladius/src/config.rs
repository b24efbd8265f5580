//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the listener and for every connection it accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    /// How long a new connection has to send its login line before it is
    /// closed without a response.
    pub login_timeout: Duration,

    /// Close a logged-in connection after this long without any traffic.
    /// `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7777".to_string(),
            login_timeout: Duration::from_secs(5),
            idle_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:7777");
        assert_eq!(config.login_timeout, Duration::from_secs(5));
        assert!(config.idle_timeout.is_none());
    }
}
