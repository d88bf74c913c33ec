//! Server configuration.

use std::time::Duration;

use pointroom_room::RoomConfig;
use pointroom_transport::DEFAULT_HANDSHAKE_TIMEOUT;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Settings for a Pointroom server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Settings applied to every room.
    pub room: RoomConfig,

    /// Detach a participant whose connection sends nothing for this long.
    /// `None` waits indefinitely.
    pub idle_timeout: Option<Duration>,

    /// How long an accepted peer gets to complete the WebSocket upgrade
    /// before its socket is dropped.
    pub handshake_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            room: RoomConfig::default(),
            idle_timeout: None,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}
