//! Core identity and value types shared by every layer.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The external identifier of an estimation room.
///
/// Opaque to the server; it comes straight from the connection path and
/// stays stable for the room's lifetime. Serialized as a bare string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// The server-minted identifier of one attached participant.
///
/// Ordered so vote maps serialize in a stable order.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A participant as everyone else in the room sees it.
///
/// Carries no transport handle; the connection lives in the room's
/// fan-out table, keyed by [`ParticipantId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Unique, never reused within the process.
    pub id: ParticipantId,
    /// Display name chosen by the user or a generated placeholder.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Votes
// ---------------------------------------------------------------------------

/// A submitted estimate.
///
/// Clients send either a card label (`"?"`, `"XL"`, `"5"`) or a number.
/// Numbers keep their integer form on the way back out, so a vote of `8`
/// is echoed as `8`, not `8.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vote {
    /// A whole number.
    Integer(i64),
    /// A fractional number such as `0.5`.
    Float(f64),
    /// Any string label.
    Text(String),
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Vote {
    fn from(label: &str) -> Self {
        Self::Text(label.to_owned())
    }
}

impl From<i64> for Vote {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// A participant's vote for the current round; `None` until submitted.
pub type VoteValue = Option<Vote>;

/// Votes keyed by participant. On the wire: `{ "<id>": vote | null }`.
pub type VoteMap = BTreeMap<ParticipantId, VoteValue>;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything a newly attached participant needs to render the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// The room's identifier.
    pub id: RoomId,
    /// Attached participants in join order.
    pub players: Vec<Participant>,
    /// The item being estimated; empty when unset.
    pub current_story: String,
    /// Every attached participant's vote.
    pub votes: VoteMap,
    /// Whether votes are currently visible.
    pub revealed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_bare_strings() {
        let json = serde_json::to_string(&ParticipantId::from("p-1")).unwrap();
        assert_eq!(json, r#""p-1""#);
        let json = serde_json::to_string(&RoomId::from("sprint-9")).unwrap();
        assert_eq!(json, r#""sprint-9""#);
    }

    #[test]
    fn test_vote_accepts_strings_and_numbers() {
        let v: Vote = serde_json::from_str(r#""XL""#).unwrap();
        assert_eq!(v, Vote::Text("XL".into()));
        let v: Vote = serde_json::from_str("13").unwrap();
        assert_eq!(v, Vote::Integer(13));
        let v: Vote = serde_json::from_str("0.5").unwrap();
        assert_eq!(v, Vote::Float(0.5));
    }

    #[test]
    fn test_vote_rejects_other_json_shapes() {
        assert!(serde_json::from_str::<Vote>("true").is_err());
        assert!(serde_json::from_str::<Vote>("[1]").is_err());
        assert!(serde_json::from_str::<Vote>(r#"{"v":1}"#).is_err());
    }

    #[test]
    fn test_vote_value_null_is_none() {
        let v: VoteValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, None);
    }

    #[test]
    fn test_snapshot_uses_camel_case_fields() {
        let snapshot = RoomSnapshot {
            id: RoomId::from("r1"),
            players: vec![Participant {
                id: ParticipantId::from("p-1"),
                name: "Ann".into(),
            }],
            current_story: "Login page".into(),
            votes: VoteMap::from([(ParticipantId::from("p-1"), None)]),
            revealed: false,
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": "r1",
                "players": [{ "id": "p-1", "name": "Ann" }],
                "currentStory": "Login page",
                "votes": { "p-1": null },
                "revealed": false,
            })
        );
    }

    #[test]
    fn test_vote_display() {
        assert_eq!(Vote::Integer(3).to_string(), "3");
        assert_eq!(Vote::from("?").to_string(), "?");
    }
}
