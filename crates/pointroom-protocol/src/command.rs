//! Inbound commands: what a participant's connection may ask the room to do.
//!
//! Every frame goes through [`ClientCommand::decode`], which either yields a
//! fully validated command or an error the gateway logs and drops. There is
//! no other path from raw bytes to a room mutation.

use serde::{Deserialize, Deserializer};

use crate::{Codec, ProtocolError, VoteValue};

/// A validated command from one participant.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// `VOTE { vote }` — submit (or with `null`, withdraw) an estimate.
    Vote { vote: VoteValue },
    /// `REVEAL` — show every vote to the room.
    Reveal,
    /// `SET_STORY { story? }` — change the item under estimation.
    SetStory { story: String },
    /// `NEXT_STORY { story? }` — same effect as `SetStory`, announced as a
    /// new round.
    NextStory { story: String },
    /// `RESET_VOTES` — clear votes and hide them, keep the story.
    ResetVotes,
    /// `LEAVE` — detach from the room; the connection is closed after.
    Leave,
}

impl ClientCommand {
    /// Decodes and validates one inbound frame.
    ///
    /// The `type` is read first; only the payload fields that command
    /// uses are then decoded, and anything else in the payload is ignored.
    ///
    /// # Errors
    /// - [`ProtocolError::Decode`] — not an envelope, or a payload field
    ///   the command reads has the wrong shape (e.g. a boolean vote).
    /// - [`ProtocolError::UnknownCommand`] — unrecognized `type`.
    /// - [`ProtocolError::InvalidMessage`] — a required payload field is
    ///   missing.
    pub fn decode(
        codec: &impl Codec,
        data: &[u8],
    ) -> Result<Self, ProtocolError> {
        let RawKind { kind } = codec.decode(data)?;
        match kind.as_str() {
            "VOTE" => {
                let raw: RawEnvelope<VotePayload> = codec.decode(data)?;
                let vote = raw.payload.and_then(|p| p.vote).ok_or_else(|| {
                    ProtocolError::InvalidMessage(
                        "VOTE requires a `vote` field".into(),
                    )
                })?;
                Ok(Self::Vote { vote })
            }
            "REVEAL" => Ok(Self::Reveal),
            "SET_STORY" => Ok(Self::SetStory {
                story: decode_story(codec, data)?,
            }),
            "NEXT_STORY" => Ok(Self::NextStory {
                story: decode_story(codec, data)?,
            }),
            "RESET_VOTES" => Ok(Self::ResetVotes),
            "LEAVE" => Ok(Self::Leave),
            _ => Err(ProtocolError::UnknownCommand(kind)),
        }
    }

    /// The wire name of this command's `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vote { .. } => "VOTE",
            Self::Reveal => "REVEAL",
            Self::SetStory { .. } => "SET_STORY",
            Self::NextStory { .. } => "NEXT_STORY",
            Self::ResetVotes => "RESET_VOTES",
            Self::Leave => "LEAVE",
        }
    }
}

/// Just the `type` of an envelope; the payload is not looked at.
#[derive(Deserialize)]
struct RawKind {
    #[serde(rename = "type")]
    kind: String,
}

/// The envelope with a payload shaped for one command. Fields the
/// command does not read are ignored.
#[derive(Deserialize)]
#[serde(bound = "P: Deserialize<'de>")]
struct RawEnvelope<P> {
    #[serde(default)]
    payload: Option<P>,
}

#[derive(Deserialize)]
struct VotePayload {
    /// Outer `Option` is "key present", inner is the nullable vote.
    #[serde(default, deserialize_with = "present")]
    vote: Option<VoteValue>,
}

#[derive(Deserialize)]
struct StoryPayload {
    #[serde(default)]
    story: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// `story` from a `SET_STORY`/`NEXT_STORY` payload; absent or `null`
/// means the empty prompt.
fn decode_story(
    codec: &impl Codec,
    data: &[u8],
) -> Result<String, ProtocolError> {
    let raw: RawEnvelope<StoryPayload> = codec.decode(data)?;
    Ok(raw.payload.and_then(|p| p.story).unwrap_or_default())
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{JsonCodec, Vote};

    fn decode(json: &str) -> Result<ClientCommand, ProtocolError> {
        ClientCommand::decode(&JsonCodec, json.as_bytes())
    }

    #[test]
    fn test_decode_vote_string_and_number() {
        assert_eq!(
            decode(r#"{"type":"VOTE","payload":{"vote":"5"}}"#).unwrap(),
            ClientCommand::Vote {
                vote: Some(Vote::from("5"))
            }
        );
        assert_eq!(
            decode(r#"{"type":"VOTE","payload":{"vote":8}}"#).unwrap(),
            ClientCommand::Vote {
                vote: Some(Vote::Integer(8))
            }
        );
    }

    #[test]
    fn test_decode_vote_null_withdraws() {
        assert_eq!(
            decode(r#"{"type":"VOTE","payload":{"vote":null}}"#).unwrap(),
            ClientCommand::Vote { vote: None }
        );
    }

    #[test]
    fn test_decode_vote_without_field_is_invalid() {
        let result = decode(r#"{"type":"VOTE","payload":{}}"#);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));

        let result = decode(r#"{"type":"VOTE"}"#);
        assert!(matches!(result, Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn test_decode_vote_with_bad_shape_fails() {
        let result = decode(r#"{"type":"VOTE","payload":{"vote":true}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_reveal_with_and_without_payload() {
        assert_eq!(
            decode(r#"{"type":"REVEAL"}"#).unwrap(),
            ClientCommand::Reveal
        );
        assert_eq!(
            decode(r#"{"type":"REVEAL","payload":{}}"#).unwrap(),
            ClientCommand::Reveal
        );
    }

    #[test]
    fn test_decode_story_defaults_to_empty() {
        assert_eq!(
            decode(r#"{"type":"SET_STORY","payload":{"story":"As a user"}}"#)
                .unwrap(),
            ClientCommand::SetStory {
                story: "As a user".into()
            }
        );
        assert_eq!(
            decode(r#"{"type":"NEXT_STORY"}"#).unwrap(),
            ClientCommand::NextStory {
                story: String::new()
            }
        );
        assert_eq!(
            decode(r#"{"type":"SET_STORY","payload":{"story":null}}"#)
                .unwrap(),
            ClientCommand::SetStory {
                story: String::new()
            }
        );
    }

    #[test]
    fn test_decode_story_with_bad_shape_fails() {
        let result = decode(r#"{"type":"SET_STORY","payload":{"story":42}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_ignores_fields_the_command_does_not_read() {
        assert_eq!(
            decode(r#"{"type":"REVEAL","payload":{"vote":true}}"#).unwrap(),
            ClientCommand::Reveal
        );
        assert_eq!(
            decode(r#"{"type":"SET_STORY","payload":{"story":"x","vote":true}}"#)
                .unwrap(),
            ClientCommand::SetStory { story: "x".into() }
        );
        assert_eq!(
            decode(r#"{"type":"VOTE","payload":{"vote":3,"story":[1]}}"#)
                .unwrap(),
            ClientCommand::Vote {
                vote: Some(Vote::Integer(3))
            }
        );
        assert_eq!(
            decode(r#"{"type":"RESET_VOTES","payload":7}"#).unwrap(),
            ClientCommand::ResetVotes
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        let result = decode(r#"{"type":"UNKNOWN"}"#);
        assert!(
            matches!(result, Err(ProtocolError::UnknownCommand(ref t)) if t == "UNKNOWN")
        );
    }

    #[test]
    fn test_decode_missing_type_fails() {
        let result = decode(r#"{"payload":{"vote":"5"}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_kind_matches_wire_name() {
        let cmd = decode(r#"{"type":"RESET_VOTES"}"#).unwrap();
        assert_eq!(cmd.kind(), "RESET_VOTES");
        let cmd = decode(r#"{"type":"LEAVE"}"#).unwrap();
        assert_eq!(cmd.kind(), "LEAVE");
    }
}
