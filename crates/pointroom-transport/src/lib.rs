//! Transport abstraction layer for Pointroom.
//!
//! Provides the [`Transport`] and [`Connection`] traits so the gateway
//! never touches a socket type directly. Each accepted connection also
//! remembers the request target (path and query) it was opened with,
//! which is how the gateway learns the room and display name.
//!
//! # Feature Flags
//!
//! - `websocket` (default) — WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    PendingWebSocket, WebSocketConnection, WebSocketTransport,
    DEFAULT_HANDSHAKE_TIMEOUT,
};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Accepting is split in two: [`accept`](Transport::accept) only takes the
/// raw connection off the listener, and the protocol handshake happens in
/// [`PendingConnection::upgrade`], which callers run on their own task so a
/// slow peer never holds up the listener.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;
    /// An accepted connection that has not finished its handshake.
    type Pending: PendingConnection<
        Connection = Self::Connection,
        Error = Self::Error,
    >;

    /// Waits for the next incoming connection. Returns as soon as the
    /// peer is accepted, before any handshake bytes are read.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// An accepted connection waiting for its handshake.
pub trait PendingConnection: Send + 'static {
    /// The connection type produced once the handshake completes.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// Completes the handshake.
    async fn upgrade(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
///
/// Sending and receiving may happen concurrently from different tasks:
/// a writer task drains outbound frames while the handler waits on
/// [`recv`](Connection::recv).
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;

    /// Returns the request target (path plus optional query) the peer
    /// used when opening the connection, e.g. `/ws/game/abc?name=Ann`.
    fn target(&self) -> &str;
}
