//! The message dispatcher: one mutation followed by its fan-out.
//!
//! Each function here is one complete pass for a single event, run by the
//! room actor to completion before the next event for that room.

use pointroom_protocol::{
    ClientCommand, Codec, Participant, ParticipantId, ServerEvent,
};

use crate::fanout::{Fanout, ParticipantSender};
use crate::{Room, RoomError};

/// Attaches a participant: join, send them the full snapshot, then tell
/// everyone else.
pub fn join<C: Codec>(
    room: &mut Room,
    fanout: &mut Fanout<C>,
    name: Option<&str>,
    sender: ParticipantSender,
) -> Participant {
    let participant = room.join(name);
    fanout.attach(participant.id.clone(), sender);

    fanout.send_to(&participant.id, &ServerEvent::GameState(room.snapshot()));
    fanout.broadcast(
        &ServerEvent::PlayerJoined(participant.clone()),
        Some(&participant.id),
    );

    tracing::info!(
        room_id = %room.id(),
        participant_id = %participant.id,
        name = %participant.name,
        participants = room.len(),
        "participant joined"
    );
    participant
}

/// Detaches a participant and announces it. A second call for the same
/// id does nothing and broadcasts nothing.
pub fn leave<C: Codec>(
    room: &mut Room,
    fanout: &mut Fanout<C>,
    participant_id: &ParticipantId,
) -> Option<Participant> {
    let participant = room.leave(participant_id)?;
    fanout.detach(participant_id);
    fanout.broadcast(
        &ServerEvent::PlayerLeft {
            player_id: participant.id.clone(),
        },
        None,
    );

    tracing::info!(
        room_id = %room.id(),
        %participant_id,
        participants = room.len(),
        "participant left"
    );
    Some(participant)
}

/// Applies one decoded command from `sender`.
///
/// # Errors
/// [`RoomError::UnknownParticipant`] if `sender` is no longer attached.
/// Nothing is mutated or broadcast in that case.
pub fn dispatch<C: Codec>(
    room: &mut Room,
    fanout: &mut Fanout<C>,
    sender: &ParticipantId,
    command: ClientCommand,
) -> Result<(), RoomError> {
    if !room.contains(sender) {
        return Err(RoomError::UnknownParticipant(
            sender.clone(),
            room.id().clone(),
        ));
    }

    match command {
        ClientCommand::Vote { vote } => {
            let all_voted = room.record_vote(sender, vote)?;
            fanout.broadcast(
                &ServerEvent::PlayerVoted {
                    player_id: sender.clone(),
                },
                None,
            );
            if all_voted {
                tracing::debug!(room_id = %room.id(), "all participants voted");
                fanout.broadcast(&ServerEvent::AllVoted, None);
            }
        }
        ClientCommand::Reveal => {
            room.reveal();
            tracing::debug!(
                room_id = %room.id(),
                phase = %room.phase(),
                "votes revealed"
            );
            fanout.broadcast(
                &ServerEvent::RevealVotes(room.votes().clone()),
                None,
            );
        }
        ClientCommand::SetStory { story } => {
            room.set_prompt(story);
            tracing::debug!(
                room_id = %room.id(),
                phase = %room.phase(),
                "story set"
            );
            fanout.broadcast(
                &ServerEvent::StorySet {
                    story: room.current_prompt().to_owned(),
                    votes: room.votes().clone(),
                },
                None,
            );
        }
        ClientCommand::NextStory { story } => {
            room.set_prompt(story);
            tracing::debug!(
                room_id = %room.id(),
                phase = %room.phase(),
                "next story"
            );
            fanout.broadcast(
                &ServerEvent::NewStory {
                    story: room.current_prompt().to_owned(),
                    votes: room.votes().clone(),
                },
                None,
            );
        }
        ClientCommand::ResetVotes => {
            room.reset_votes();
            tracing::debug!(
                room_id = %room.id(),
                phase = %room.phase(),
                "votes reset"
            );
            fanout.broadcast(
                &ServerEvent::VotesReset {
                    votes: room.votes().clone(),
                },
                None,
            );
        }
        ClientCommand::Leave => {
            leave(room, fanout, sender);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pointroom_protocol::{JsonCodec, RoomId, Vote, VoteMap};
    use tokio::sync::mpsc;

    use super::*;
    use crate::fanout::Frame;

    type Inbox = mpsc::UnboundedReceiver<Frame>;

    struct Harness {
        room: Room,
        fanout: Fanout<JsonCodec>,
    }

    impl Harness {
        fn new() -> Self {
            let id = RoomId::from("R1");
            Self {
                room: Room::new(id.clone()),
                fanout: Fanout::new(id, JsonCodec),
            }
        }

        fn join(&mut self, name: &str) -> (ParticipantId, Inbox) {
            let (tx, rx) = mpsc::unbounded_channel();
            let p = join(&mut self.room, &mut self.fanout, Some(name), tx);
            (p.id, rx)
        }

        fn send(
            &mut self,
            sender: &ParticipantId,
            command: ClientCommand,
        ) -> Result<(), RoomError> {
            dispatch(&mut self.room, &mut self.fanout, sender, command)
        }
    }

    fn drain(inbox: &mut Inbox) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = inbox.try_recv() {
            events.push(serde_json::from_slice(&frame).unwrap());
        }
        events
    }

    fn vote(value: &str) -> ClientCommand {
        ClientCommand::Vote {
            vote: Some(Vote::from(value)),
        }
    }

    #[test]
    fn test_join_sends_snapshot_to_newcomer_and_joined_to_others() {
        let mut h = Harness::new();
        let (a, mut inbox_a) = h.join("A");
        drain(&mut inbox_a);

        let (b, mut inbox_b) = h.join("B");

        let to_b = drain(&mut inbox_b);
        assert_eq!(to_b.len(), 1);
        match &to_b[0] {
            ServerEvent::GameState(snap) => {
                assert_eq!(snap.players.len(), 2);
                assert!(snap.votes.contains_key(&a));
                assert!(snap.votes.contains_key(&b));
            }
            other => panic!("expected GameState, got {other:?}"),
        }

        let to_a = drain(&mut inbox_a);
        assert_eq!(to_a.len(), 1);
        assert!(
            matches!(&to_a[0], ServerEvent::PlayerJoined(p) if p.id == b && p.name == "B")
        );
    }

    #[test]
    fn test_all_voted_emitted_once_when_last_vote_lands() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        let (b, _) = h.join("B");
        let (c, _) = h.join("C");
        drain(&mut inbox);

        h.send(&a, vote("5")).unwrap();
        h.send(&b, vote("8")).unwrap();
        let events = drain(&mut inbox);
        assert_eq!(events.len(), 2);
        assert!(!events.contains(&ServerEvent::AllVoted));

        h.send(&c, vote("5")).unwrap();
        let events = drain(&mut inbox);
        assert_eq!(
            events,
            vec![
                ServerEvent::PlayerVoted {
                    player_id: c.clone()
                },
                ServerEvent::AllVoted,
            ]
        );
    }

    #[test]
    fn test_reveal_broadcasts_current_votes_including_nulls() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        let (b, _) = h.join("B");
        let (c, _) = h.join("C");
        h.send(&a, vote("5")).unwrap();
        h.send(&c, vote("5")).unwrap();
        drain(&mut inbox);

        h.send(&b, ClientCommand::Reveal).unwrap();

        let expected = VoteMap::from([
            (a, Some(Vote::from("5"))),
            (b, None),
            (c, Some(Vote::from("5"))),
        ]);
        assert_eq!(drain(&mut inbox), vec![ServerEvent::RevealVotes(expected)]);
        assert!(h.room.is_revealed());
    }

    #[test]
    fn test_reveal_twice_rebroadcasts_same_snapshot() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        h.send(&a, vote("1")).unwrap();
        drain(&mut inbox);

        h.send(&a, ClientCommand::Reveal).unwrap();
        h.send(&a, ClientCommand::Reveal).unwrap();

        let events = drain(&mut inbox);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], events[1]);
    }

    #[test]
    fn test_set_story_while_revealed_resets_round() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        let (b, _) = h.join("B");
        h.send(&a, vote("5")).unwrap();
        h.send(&a, ClientCommand::Reveal).unwrap();
        drain(&mut inbox);

        h.send(
            &a,
            ClientCommand::SetStory {
                story: "As a user, I want...".into(),
            },
        )
        .unwrap();

        assert!(!h.room.is_revealed());
        assert_eq!(h.room.current_prompt(), "As a user, I want...");
        assert_eq!(
            drain(&mut inbox),
            vec![ServerEvent::StorySet {
                story: "As a user, I want...".into(),
                votes: VoteMap::from([(a, None), (b, None)]),
            }]
        );
    }

    #[test]
    fn test_next_story_answers_with_new_story() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        drain(&mut inbox);

        h.send(&a, ClientCommand::NextStory { story: String::new() })
            .unwrap();

        let events = drain(&mut inbox);
        assert!(matches!(
            &events[..],
            [ServerEvent::NewStory { story, .. }] if story.is_empty()
        ));
    }

    #[test]
    fn test_reset_votes_keeps_story() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        h.send(&a, ClientCommand::SetStory { story: "S".into() })
            .unwrap();
        h.send(&a, vote("2")).unwrap();
        drain(&mut inbox);

        h.send(&a, ClientCommand::ResetVotes).unwrap();

        assert_eq!(h.room.current_prompt(), "S");
        assert_eq!(
            drain(&mut inbox),
            vec![ServerEvent::VotesReset {
                votes: VoteMap::from([(a, None)]),
            }]
        );
    }

    #[test]
    fn test_all_voted_after_departure_counts_remaining_only() {
        let mut h = Harness::new();
        let (a, mut inbox) = h.join("A");
        let (b, _) = h.join("B");
        let (c, _) = h.join("C");
        h.send(&a, vote("5")).unwrap();
        h.send(&c, vote("3")).unwrap();

        leave(&mut h.room, &mut h.fanout, &b);
        drain(&mut inbox);

        h.send(&c, vote("8")).unwrap();
        let events = drain(&mut inbox);
        assert!(events.contains(&ServerEvent::AllVoted));
        assert!(h.room.all_voted());
    }

    #[test]
    fn test_command_from_departed_participant_is_rejected_quietly() {
        let mut h = Harness::new();
        let (_a, mut inbox) = h.join("A");
        let (b, _) = h.join("B");
        leave(&mut h.room, &mut h.fanout, &b);
        drain(&mut inbox);

        let result = h.send(&b, vote("5"));
        assert!(matches!(result, Err(RoomError::UnknownParticipant(..))));
        let result = h.send(&b, ClientCommand::Reveal);
        assert!(matches!(result, Err(RoomError::UnknownParticipant(..))));

        assert!(drain(&mut inbox).is_empty());
        assert!(!h.room.is_revealed());
        assert_eq!(h.room.votes().len(), 1);
    }

    #[test]
    fn test_leave_command_broadcasts_and_second_leave_is_silent() {
        let mut h = Harness::new();
        let (_a, mut inbox) = h.join("A");
        let (b, _) = h.join("B");
        drain(&mut inbox);

        h.send(&b, ClientCommand::Leave).unwrap();
        assert!(leave(&mut h.room, &mut h.fanout, &b).is_none());

        assert_eq!(
            drain(&mut inbox),
            vec![ServerEvent::PlayerLeft { player_id: b }]
        );
        assert_eq!(h.room.len(), 1);
        assert_eq!(h.fanout.len(), 1);
    }

    #[test]
    fn test_departing_participant_gets_no_left_event() {
        let mut h = Harness::new();
        let (a, mut inbox_a) = h.join("A");
        drain(&mut inbox_a);

        leave(&mut h.room, &mut h.fanout, &a);

        assert!(drain(&mut inbox_a).is_empty());
    }
}
