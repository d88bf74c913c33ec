//! # Pointroom
//!
//! Real-time estimation rooms ("planning poker") over WebSockets.
//!
//! Clients open `/ws/game/{roomId}?name=<display name>`, receive the
//! room's full state, and from then on exchange small JSON envelopes:
//! votes, reveals, and new prompts go in; every change comes back out to
//! everyone in the room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pointroom::prelude::*;
//!
//! # async fn run() -> Result<(), PointroomError> {
//! let server = PointroomServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod target;

pub use config::{ServerConfig, DEFAULT_BIND_ADDR};
pub use error::PointroomError;
pub use server::{PointroomServer, PointroomServerBuilder};
pub use target::ConnectionTarget;

/// Everything needed to run a server or talk to its rooms.
pub mod prelude {
    pub use crate::{
        ConnectionTarget, PointroomError, PointroomServer,
        PointroomServerBuilder, ServerConfig,
    };
    pub use pointroom_protocol::{
        ClientCommand, Codec, JsonCodec, Participant, ParticipantId,
        ProtocolError, RoomId, RoomSnapshot, ServerEvent, Vote, VoteMap,
        VoteValue,
    };
    pub use pointroom_room::{RoomConfig, RoomError, RoomHandle, RoomRegistry};
    pub use pointroom_transport::TransportError;
}
