//! Connection target parsing.
//!
//! A client opens `/ws/game/{roomId}?name=<display name>`. The room id is
//! one or more ASCII letters, digits, or hyphens; anything else is refused
//! before any room state is touched.

use pointroom_protocol::{ProtocolError, RoomId};
use url::Url;

/// Base used to resolve origin-form request targets.
const TARGET_BASE: &str = "http://localhost";

/// The room and display name a connection asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Room to join, created on first reference.
    pub room_id: RoomId,

    /// Percent-decoded, trimmed display name. `None` when the query has
    /// no `name` or it is blank; the room picks a placeholder.
    pub name: Option<String>,
}

impl ConnectionTarget {
    /// Parses a request target such as `/ws/game/abc?name=Ann%20B`.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidTarget`] if the path is not
    /// `/ws/game/{roomId}` with a well-formed room id.
    pub fn parse(target: &str) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::InvalidTarget(target.to_owned());

        let base = Url::parse(TARGET_BASE).map_err(|_| invalid())?;
        let url = base.join(target).map_err(|_| invalid())?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();
        let room_id = match segments.as_slice() {
            ["ws", "game", id] if is_room_id(id) => RoomId::from(*id),
            _ => return Err(invalid()),
        };

        let name = url
            .query_pairs()
            .find(|(key, _)| key == "name")
            .map(|(_, value)| value.trim().to_owned())
            .filter(|name| !name.is_empty());

        Ok(Self { room_id, name })
    }
}

fn is_room_id(id: &str) -> bool {
    !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_room_and_name() {
        let target = ConnectionTarget::parse("/ws/game/abc?name=Ann%20B").unwrap();
        assert_eq!(target.room_id, RoomId::from("abc"));
        assert_eq!(target.name.as_deref(), Some("Ann B"));
    }

    #[test]
    fn test_parse_without_query() {
        let target = ConnectionTarget::parse("/ws/game/sprint-42").unwrap();
        assert_eq!(target.room_id, RoomId::from("sprint-42"));
        assert_eq!(target.name, None);
    }

    #[test]
    fn test_blank_name_is_none() {
        let target = ConnectionTarget::parse("/ws/game/R1?name=%20%20").unwrap();
        assert_eq!(target.name, None);

        let target = ConnectionTarget::parse("/ws/game/R1?name=").unwrap();
        assert_eq!(target.name, None);
    }

    #[test]
    fn test_name_is_trimmed_and_plus_decodes_to_space() {
        let target =
            ConnectionTarget::parse("/ws/game/R1?name=+Bob+Smith+").unwrap();
        assert_eq!(target.name.as_deref(), Some("Bob Smith"));
    }

    #[test]
    fn test_first_name_wins() {
        let target =
            ConnectionTarget::parse("/ws/game/R1?x=1&name=A&name=B").unwrap();
        assert_eq!(target.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        for target in ["/", "/ws", "/ws/game", "/ws/game/", "/game/abc", "/ws/room/abc"] {
            let err = ConnectionTarget::parse(target).unwrap_err();
            assert!(
                matches!(err, ProtocolError::InvalidTarget(_)),
                "{target} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_room_ids() {
        for target in [
            "/ws/game/a_b",
            "/ws/game/a%20b",
            "/ws/game/abc/extra",
            "/ws/game/abc/",
            "/ws/game/caf%C3%A9",
        ] {
            assert!(
                ConnectionTarget::parse(target).is_err(),
                "{target} should be rejected"
            );
        }
    }
}
