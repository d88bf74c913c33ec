//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The room and gateway layers never call a serializer directly; they go
//! through a [`Codec`]. Events are encoded once per broadcast and the same
//! bytes are handed to every recipient.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance lives in every room
/// actor and in the shared server state.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON is what browser clients speak, so this is the only codec the
/// server ships with.
///
/// ```rust
/// use pointroom_protocol::{Codec, JsonCodec, ParticipantId, ServerEvent};
///
/// let codec = JsonCodec;
/// let event = ServerEvent::PlayerLeft {
///     player_id: ParticipantId::from("p-1"),
/// };
///
/// let bytes = codec.encode(&event).unwrap();
/// assert_eq!(
///     bytes,
///     br#"{"type":"PLAYER_LEFT","payload":{"playerId":"p-1"}}"#,
/// );
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
