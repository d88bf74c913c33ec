//! Unified error type for Pointroom.

use pointroom_protocol::ProtocolError;
use pointroom_room::RoomError;
use pointroom_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls,
/// so `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PointroomError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (bad target, encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (unknown participant, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
