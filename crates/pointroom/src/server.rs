//! `PointroomServer` builder and accept loop.
//!
//! Ties the layers together: transport → gateway → room registry.

use std::sync::Arc;
use std::time::Duration;

use pointroom_protocol::{Codec, JsonCodec};
use pointroom_room::{RoomConfig, RoomRegistry};
use pointroom_transport::{PendingConnection, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{PointroomError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry does its own locking.
pub(crate) struct ServerState<C: Codec + Clone> {
    pub(crate) registry: Arc<RoomRegistry<C>>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Builder for configuring and starting a Pointroom server.
///
/// # Example
///
/// ```rust,no_run
/// use pointroom::prelude::*;
///
/// # async fn run() -> Result<(), PointroomError> {
/// let server = PointroomServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct PointroomServerBuilder {
    config: ServerConfig,
}

impl PointroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Detaches participants whose connection is silent for `timeout`.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Drops accepted peers that have not finished the WebSocket upgrade
    /// within `timeout`.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    /// Sets the configuration applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server with `JsonCodec`.
    ///
    /// # Errors
    /// Fails if the listener cannot bind; nothing else here can fail.
    pub async fn build(
        self,
    ) -> Result<PointroomServer<JsonCodec>, PointroomError> {
        self.build_with_codec(JsonCodec).await
    }

    /// Binds the listener and builds the server with a custom codec.
    pub async fn build_with_codec<C: Codec + Clone>(
        self,
        codec: C,
    ) -> Result<PointroomServer<C>, PointroomError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .handshake_timeout(self.config.handshake_timeout);

        let state = Arc::new(ServerState {
            registry: Arc::new(RoomRegistry::new(
                codec.clone(),
                self.config.room,
            )),
            codec,
            idle_timeout: self.config.idle_timeout,
        });

        Ok(PointroomServer { transport, state })
    }
}

impl Default for PointroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Pointroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PointroomServer<C: Codec + Clone> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl PointroomServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> PointroomServerBuilder {
        PointroomServerBuilder::new()
    }
}

impl<C: Codec + Clone> PointroomServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the room registry, for pushing events into rooms from
    /// outside any connection. Stays valid after [`run()`](Self::run)
    /// takes the server.
    pub fn registry(&self) -> Arc<RoomRegistry<C>> {
        Arc::clone(&self.state.registry)
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own task, which runs the
    /// WebSocket upgrade and then the handler; the loop goes straight back
    /// to accepting. A failed accept or upgrade is logged and the loop
    /// keeps going. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PointroomError> {
        tracing::info!(
            addr = ?self.local_addr().ok(),
            "Pointroom server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn = match pending.upgrade().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(
                                    error = %e,
                                    "upgrade failed"
                                );
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
