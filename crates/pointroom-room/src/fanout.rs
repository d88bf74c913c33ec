//! Broadcast fan-out: the room's side table of outbound queues.
//!
//! Each attached participant has an unbounded queue of encoded frames; a
//! per-connection writer task drains it onto the socket. Pushing into a
//! queue never blocks, so a slow or dead peer cannot hold up the room or
//! anyone else in it.

use std::collections::HashMap;
use std::sync::Arc;

use pointroom_protocol::{Codec, ParticipantId, RoomId, ServerEvent};
use tokio::sync::mpsc;

/// One encoded event, shared between every recipient's queue.
pub type Frame = Arc<[u8]>;

/// Queue for delivering frames to one participant's connection.
pub type ParticipantSender = mpsc::UnboundedSender<Frame>;

/// Maps attached participants to their outbound queues.
pub struct Fanout<C: Codec> {
    room_id: RoomId,
    codec: C,
    recipients: HashMap<ParticipantId, ParticipantSender>,
}

impl<C: Codec> Fanout<C> {
    /// Creates an empty fan-out table for `room_id`.
    pub fn new(room_id: RoomId, codec: C) -> Self {
        Self {
            room_id,
            codec,
            recipients: HashMap::new(),
        }
    }

    /// Registers a participant's outbound queue.
    pub fn attach(
        &mut self,
        participant_id: ParticipantId,
        sender: ParticipantSender,
    ) {
        self.recipients.insert(participant_id, sender);
    }

    /// Forgets a participant's queue. Dropping the sender lets the
    /// connection's writer task finish.
    pub fn detach(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Option<ParticipantSender> {
        self.recipients.remove(participant_id)
    }

    /// Encodes `event` once and queues it for every recipient except
    /// `exclude`.
    ///
    /// Returns how many queues accepted the frame. Per-recipient failures
    /// are logged and skipped; nothing is reported to the caller.
    pub fn broadcast(
        &self,
        event: &ServerEvent,
        exclude: Option<&ParticipantId>,
    ) -> usize {
        let Some(frame) = self.encode(event) else {
            return 0;
        };

        let mut delivered = 0;
        for (participant_id, sender) in &self.recipients {
            if Some(participant_id) == exclude {
                continue;
            }
            if self.push(participant_id, sender, &frame, event) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Queues `event` for a single participant.
    pub fn send_to(
        &self,
        participant_id: &ParticipantId,
        event: &ServerEvent,
    ) -> bool {
        let Some(sender) = self.recipients.get(participant_id) else {
            return false;
        };
        match self.encode(event) {
            Some(frame) => self.push(participant_id, sender, &frame, event),
            None => false,
        }
    }

    /// Number of registered queues.
    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    /// Returns `true` if no queue is registered.
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    fn encode(&self, event: &ServerEvent) -> Option<Frame> {
        match self.codec.encode(event) {
            Ok(bytes) => Some(Frame::from(bytes)),
            Err(e) => {
                tracing::error!(
                    room_id = %self.room_id,
                    event = event.kind(),
                    error = %e,
                    "failed to encode event"
                );
                None
            }
        }
    }

    fn push(
        &self,
        participant_id: &ParticipantId,
        sender: &ParticipantSender,
        frame: &Frame,
        event: &ServerEvent,
    ) -> bool {
        match sender.send(Arc::clone(frame)) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    room_id = %self.room_id,
                    %participant_id,
                    event = event.kind(),
                    "delivery failed, connection already gone"
                );
                false
            }
        }
    }
}
