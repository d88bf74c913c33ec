//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! Every event for a room (join, command, leave) travels through the
//! actor's channel and is handled to completion before the next one, so
//! room mutations never interleave and broadcasts reach each participant
//! in mutation order. Rooms do not share a lock; unrelated rooms never
//! contend.

use pointroom_protocol::{
    ClientCommand, Codec, Participant, ParticipantId, RoomId, RoomSnapshot,
    ServerEvent,
};
use tokio::sync::{mpsc, oneshot};

use crate::dispatch;
use crate::fanout::{Fanout, ParticipantSender};
use crate::{Room, RoomError};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in some variants is the reply channel.
pub(crate) enum RoomCommand {
    /// Attach a new participant.
    Join {
        name: Option<String>,
        sender: ParticipantSender,
        reply: oneshot::Sender<Participant>,
    },

    /// Apply a decoded command from an attached participant.
    Command {
        sender: ParticipantId,
        command: ClientCommand,
    },

    /// Detach a participant (close, error, or drop guard).
    Leave { participant_id: ParticipantId },

    /// Deliver an event to the room outside of any command.
    Broadcast {
        event: ServerEvent,
        exclude: Option<ParticipantId>,
    },

    /// Request a copy of the room's state.
    Snapshot { reply: oneshot::Sender<RoomSnapshot> },
}

/// Handle to a running room actor.
///
/// Cheap to clone; the registry holds one per room and every connection
/// attached to the room holds another.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's ID.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Attaches a participant and waits for their identity.
    ///
    /// By the time this returns, the participant's queue already holds
    /// the room snapshot and the rest of the room has been told.
    pub async fn join(
        &self,
        name: Option<String>,
        sender: ParticipantSender,
    ) -> Result<Participant, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            name,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Forwards a command from `sender` (fire-and-forget).
    pub async fn command(
        &self,
        sender: ParticipantId,
        command: ClientCommand,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Command { sender, command }).await
    }

    /// Asks the room to detach `participant_id` (fire-and-forget).
    pub async fn leave(
        &self,
        participant_id: ParticipantId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Leave { participant_id }).await
    }

    /// Broadcasts `event` to every attached participant except `exclude`.
    pub async fn broadcast(
        &self,
        event: ServerEvent,
        exclude: Option<ParticipantId>,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Broadcast { event, exclude }).await
    }

    /// Returns a copy of the room's current state.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<C: Codec> {
    room: Room,
    fanout: Fanout<C>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<C: Codec> RoomActor<C> {
    /// Processes commands until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle(cmd);
        }

        tracing::info!(room_id = %self.room.id(), "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                name,
                sender,
                reply,
            } => {
                let participant = dispatch::join(
                    &mut self.room,
                    &mut self.fanout,
                    name.as_deref(),
                    sender,
                );
                if reply.send(participant.clone()).is_err() {
                    // The connection gave up while queued; undo the attach.
                    dispatch::leave(
                        &mut self.room,
                        &mut self.fanout,
                        &participant.id,
                    );
                }
            }
            RoomCommand::Command { sender, command } => {
                let kind = command.kind();
                if let Err(e) = dispatch::dispatch(
                    &mut self.room,
                    &mut self.fanout,
                    &sender,
                    command,
                ) {
                    tracing::debug!(
                        room_id = %self.room.id(),
                        command = kind,
                        error = %e,
                        "command dropped"
                    );
                }
            }
            RoomCommand::Leave { participant_id } => {
                dispatch::leave(
                    &mut self.room,
                    &mut self.fanout,
                    &participant_id,
                );
            }
            RoomCommand::Broadcast { event, exclude } => {
                self.fanout.broadcast(&event, exclude.as_ref());
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.room.snapshot());
            }
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `channel_capacity` bounds the command queue; senders wait when it is
/// full. A capacity of zero is treated as one.
pub(crate) fn spawn_room<C: Codec>(
    room_id: RoomId,
    codec: C,
    channel_capacity: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_capacity.max(1));

    let actor = RoomActor {
        room: Room::new(room_id.clone()),
        fanout: Fanout::new(room_id.clone(), codec),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
