//! Server-level settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Upper bound on a `request-ranking` limit.
pub const MAX_RANKING_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,

    /// Connections that send no frame at all for this long, pongs to the
    /// server's keepalive pings included, are dropped. `None` waits forever.
    pub idle_timeout: Option<Duration>,

    /// Entries returned by `request-ranking` without a limit.
    pub ranking_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".to_string(),
            idle_timeout: Some(Duration::from_secs(300)),
            ranking_limit: 10,
        }
    }
}

impl ServerConfig {
    /// The limit a ranking request ends up with.
    pub fn ranking_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.ranking_limit)
            .clamp(1, MAX_RANKING_LIMIT)
    }
}
