//! Error types for the room layer.

use pointroom_protocol::{ParticipantId, RoomId};

/// Errors that can occur during room operations.
///
/// Neither variant is ever reported back to a connection; the caller
/// logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The participant is not attached to this room, typically a command
    /// that raced the participant's own leave.
    #[error("participant {0} is not in room {1}")]
    UnknownParticipant(ParticipantId, RoomId),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
