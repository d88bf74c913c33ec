//! Wire protocol for Pointroom.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`RoomId`], [`ParticipantId`], [`Participant`], [`Vote`],
//!   [`RoomSnapshot`]) shared by every layer.
//! - **Commands** ([`ClientCommand`]) — the closed set of inbound requests,
//!   produced by a single validating decode step.
//! - **Events** ([`ServerEvent`]) — everything a room broadcasts.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how the above become
//!   bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientCommand / ServerEvent) → Room
//! ```

mod codec;
mod command;
mod error;
mod event;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::ClientCommand;
pub use error::ProtocolError;
pub use event::ServerEvent;
pub use types::{
    Participant, ParticipantId, RoomId, RoomSnapshot, Vote, VoteMap,
    VoteValue,
};
