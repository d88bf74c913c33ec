//! Estimation rooms for Pointroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's state and its participants' outbound queues.
//!
//! # Key types
//!
//! - [`Room`] — the state machine: participants, prompt, votes, reveal
//! - [`Fanout`] — outbound queues keyed by participant
//! - [`dispatch`] — one mutation plus its broadcast per event
//! - [`RoomHandle`] — send events to a running room actor
//! - [`RoomRegistry`] — finds or creates rooms by id

mod actor;
mod config;
pub mod dispatch;
mod error;
mod fanout;
mod registry;
mod room;

pub use actor::RoomHandle;
pub use config::{RoomConfig, DEFAULT_CHANNEL_CAPACITY};
pub use error::RoomError;
pub use fanout::{Fanout, Frame, ParticipantSender};
pub use registry::RoomRegistry;
pub use room::{Room, RoomPhase};
