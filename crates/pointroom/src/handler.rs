//! Per-connection handler: the gateway between a socket and its room.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Parse the request target → room id and display name
//!   2. Join the room (it queues the snapshot and announces the newcomer)
//!   3. Spawn a writer task draining the participant's queue to the socket
//!   4. Loop: receive frames → decode → forward to the room actor

use std::sync::Arc;

use pointroom_protocol::{ClientCommand, Codec, ParticipantId};
use pointroom_room::{Frame, RoomHandle};
use pointroom_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::target::ConnectionTarget;
use crate::PointroomError;

/// Drop guard that detaches the participant when the handler exits.
///
/// Fires on clean close, receive error, idle timeout, or panic. Since
/// `Drop` is synchronous, the leave is sent from a fire-and-forget task.
/// A leave for an already-detached participant is a no-op in the room.
struct LeaveGuard {
    room: RoomHandle,
    participant_id: ParticipantId,
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        let room = self.room.clone();
        let participant_id = self.participant_id.clone();
        tokio::spawn(async move {
            let _ = room.leave(participant_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec + Clone>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PointroomError> {
    let conn_id = conn.id();

    // --- Step 1: Target ---
    let target = match ConnectionTarget::parse(conn.target()) {
        Ok(target) => target,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "rejecting connection");
            let _ = conn.close().await;
            return Err(e.into());
        }
    };

    // --- Step 2: Join ---
    let room = state.registry.get_or_create(&target.room_id).await;
    let (tx, rx) = mpsc::unbounded_channel();
    let participant = room.join(target.name, tx).await?;
    let participant_id = participant.id;

    let conn = Arc::new(conn);
    tokio::spawn(write_frames(Arc::clone(&conn), rx));

    let _guard = LeaveGuard {
        room: room.clone(),
        participant_id: participant_id.clone(),
    };

    tracing::debug!(
        %conn_id,
        room_id = %room.room_id(),
        %participant_id,
        "connection attached"
    );

    // --- Step 3: Message loop ---
    loop {
        let received = match state.idle_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, conn.recv()).await {
                    Ok(received) => received,
                    Err(_) => {
                        tracing::info!(%participant_id, "connection timed out");
                        break;
                    }
                }
            }
            None => conn.recv().await,
        };

        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%participant_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%participant_id, error = %e, "recv error");
                break;
            }
        };

        let command = match ClientCommand::decode(&state.codec, &data) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(
                    %participant_id, error = %e, "ignoring inbound message"
                );
                continue;
            }
        };

        let leaving = matches!(command, ClientCommand::Leave);
        room.command(participant_id.clone(), command).await?;
        if leaving {
            break;
        }
    }

    // _guard drops here → leave fires.
    Ok(())
}

/// Drains a participant's outbound queue onto the socket.
///
/// The queue ends when the room detaches the participant; the socket is
/// closed then, which also covers a `LEAVE` sent by the client. A send
/// failure stops the writer; the read side notices the dead socket on its
/// own.
async fn write_frames(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<Frame>,
) {
    let conn_id = conn.id();
    while let Some(frame) = rx.recv().await {
        if let Err(e) = conn.send(&frame).await {
            tracing::debug!(%conn_id, error = %e, "send failed, writer stopping");
            return;
        }
    }
    let _ = conn.close().await;
}
