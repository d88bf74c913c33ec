//! Outbound events: what the room tells its participants.
//!
//! Serialized as `{ "type": "...", "payload": ... }`; events without a
//! payload (only [`ServerEvent::AllVoted`]) carry just the tag.

use serde::{Deserialize, Serialize};

use crate::{Participant, ParticipantId, RoomSnapshot, VoteMap};

/// Events broadcast by a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum ServerEvent {
    /// Full room state, sent only to the participant that just joined.
    GameState(RoomSnapshot),

    /// Someone attached to the room.
    PlayerJoined(Participant),

    /// Someone voted. The value stays hidden until reveal.
    PlayerVoted {
        #[serde(rename = "playerId")]
        player_id: ParticipantId,
    },

    /// Every attached participant has a non-null vote. Informational only;
    /// it does not reveal anything.
    AllVoted,

    /// The full vote map, nulls included.
    RevealVotes(VoteMap),

    /// Answer to `SET_STORY`: new story and the cleared votes.
    StorySet { story: String, votes: VoteMap },

    /// Answer to `NEXT_STORY`: new story and the cleared votes.
    NewStory { story: String, votes: VoteMap },

    /// Answer to `RESET_VOTES`: the cleared votes, story unchanged.
    VotesReset { votes: VoteMap },

    /// Someone detached (leave, close, or connection error).
    PlayerLeft {
        #[serde(rename = "playerId")]
        player_id: ParticipantId,
    },
}

impl ServerEvent {
    /// The wire name of this event's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GameState(_) => "GAME_STATE",
            Self::PlayerJoined(_) => "PLAYER_JOINED",
            Self::PlayerVoted { .. } => "PLAYER_VOTED",
            Self::AllVoted => "ALL_VOTED",
            Self::RevealVotes(_) => "REVEAL_VOTES",
            Self::StorySet { .. } => "STORY_SET",
            Self::NewStory { .. } => "NEW_STORY",
            Self::VotesReset { .. } => "VOTES_RESET",
            Self::PlayerLeft { .. } => "PLAYER_LEFT",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{RoomId, Vote};

    fn pid(id: &str) -> ParticipantId {
        ParticipantId::from(id)
    }

    #[test]
    fn test_all_voted_has_no_payload() {
        let value = serde_json::to_value(ServerEvent::AllVoted).unwrap();
        assert_eq!(value, json!({ "type": "ALL_VOTED" }));
    }

    #[test]
    fn test_player_voted_withholds_value() {
        let value = serde_json::to_value(ServerEvent::PlayerVoted {
            player_id: pid("p-1"),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "PLAYER_VOTED", "payload": { "playerId": "p-1" } })
        );
    }

    #[test]
    fn test_reveal_votes_payload_is_the_map() {
        let votes = VoteMap::from([
            (pid("a"), Some(Vote::from("5"))),
            (pid("b"), None),
            (pid("c"), Some(Vote::Integer(5))),
        ]);
        let value =
            serde_json::to_value(ServerEvent::RevealVotes(votes)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "REVEAL_VOTES",
                "payload": { "a": "5", "b": null, "c": 5 }
            })
        );
    }

    #[test]
    fn test_story_events_carry_story_and_votes() {
        let votes = VoteMap::from([(pid("a"), None)]);
        let set = serde_json::to_value(ServerEvent::StorySet {
            story: "Checkout".into(),
            votes: votes.clone(),
        })
        .unwrap();
        assert_eq!(
            set,
            json!({
                "type": "STORY_SET",
                "payload": { "story": "Checkout", "votes": { "a": null } }
            })
        );

        let next = serde_json::to_value(ServerEvent::NewStory {
            story: String::new(),
            votes,
        })
        .unwrap();
        assert_eq!(next["type"], "NEW_STORY");
        assert_eq!(next["payload"]["story"], "");
    }

    #[test]
    fn test_game_state_and_joined_shapes() {
        let ann = Participant {
            id: pid("p-1"),
            name: "Ann".into(),
        };
        let joined =
            serde_json::to_value(ServerEvent::PlayerJoined(ann.clone()))
                .unwrap();
        assert_eq!(
            joined,
            json!({ "type": "PLAYER_JOINED", "payload": { "id": "p-1", "name": "Ann" } })
        );

        let state = ServerEvent::GameState(RoomSnapshot {
            id: RoomId::from("r1"),
            players: vec![ann],
            current_story: String::new(),
            votes: VoteMap::from([(pid("p-1"), None)]),
            revealed: false,
        });
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["type"], "GAME_STATE");
        assert_eq!(value["payload"]["players"][0]["name"], "Ann");
        assert_eq!(value["payload"]["revealed"], false);
    }

    #[test]
    fn test_events_decode_back_for_clients() {
        let event: ServerEvent =
            serde_json::from_str(r#"{"type":"ALL_VOTED"}"#).unwrap();
        assert_eq!(event, ServerEvent::AllVoted);
        let event: ServerEvent = serde_json::from_str(
            r#"{"type":"PLAYER_LEFT","payload":{"playerId":"p-9"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ServerEvent::PlayerLeft {
                player_id: pid("p-9")
            }
        );
        assert_eq!(event.kind(), "PLAYER_LEFT");
    }
}
