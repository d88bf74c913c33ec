//! Error types for the protocol layer.
//!
//! Everything here is non-fatal: a connection that sends a bad frame or
//! asks for a bad target is dealt with locally by the gateway.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing `type`, or a
    /// payload field of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope decoded but its `type` is not a known command.
    #[error("unknown command type: {0}")]
    UnknownCommand(String),

    /// The command is recognized but its payload is missing something
    /// it requires.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The connection request target does not name a room.
    #[error("invalid connection target: {0}")]
    InvalidTarget(String),
}
