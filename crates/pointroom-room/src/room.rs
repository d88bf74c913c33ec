//! The room state machine.
//!
//! [`Room`] owns one estimation session: who is attached, what is being
//! estimated, each participant's vote, and whether votes are visible. It
//! performs no I/O. Callers pair every mutation with a fan-out.
//!
//! ```text
//!            reveal
//!   Voting ─────────→ Revealed
//!     ↑                  │
//!     └──────────────────┘
//!     set_prompt / reset_votes
//! ```
//!
//! `join`, `leave`, and `record_vote` change participants and votes in
//! either phase without moving between phases.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use pointroom_protocol::{
    Participant, ParticipantId, RoomId, RoomSnapshot, VoteMap, VoteValue,
};
use rand::Rng;

use crate::RoomError;

/// Process-wide participant counter. Never reset, so an id is never
/// handed out twice.
static NEXT_PARTICIPANT: AtomicU64 = AtomicU64::new(1);

/// Whether votes for the current prompt are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Votes are hidden and being collected.
    Voting,
    /// Votes are visible to everyone.
    Revealed,
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voting => write!(f, "Voting"),
            Self::Revealed => write!(f, "Revealed"),
        }
    }
}

/// One estimation room.
///
/// Invariant after every method: the keys of `votes` are exactly the ids
/// in `participants`.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    participants: Vec<Participant>,
    current_prompt: String,
    votes: VoteMap,
    revealed: bool,
}

impl Room {
    /// Creates an empty room in the `Voting` phase with no prompt.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: Vec::new(),
            current_prompt: String::new(),
            votes: VoteMap::new(),
            revealed: false,
        }
    }

    /// Attaches a new participant with a fresh id and an empty vote.
    ///
    /// A missing or blank `name` is replaced with a placeholder derived
    /// from the id.
    pub fn join(&mut self, name: Option<&str>) -> Participant {
        let id = next_participant_id();
        let name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => placeholder_name(&id),
        };
        let participant = Participant { id, name };

        self.votes.insert(participant.id.clone(), None);
        self.participants.push(participant.clone());
        participant
    }

    /// Records `vote` for `participant_id`.
    ///
    /// Returns whether every attached participant now has a non-null vote.
    ///
    /// # Errors
    /// [`RoomError::UnknownParticipant`] if the participant is not
    /// attached, e.g. a vote that arrived after the participant left.
    pub fn record_vote(
        &mut self,
        participant_id: &ParticipantId,
        vote: VoteValue,
    ) -> Result<bool, RoomError> {
        let slot = self.votes.get_mut(participant_id).ok_or_else(|| {
            RoomError::UnknownParticipant(
                participant_id.clone(),
                self.id.clone(),
            )
        })?;
        *slot = vote;
        Ok(self.all_voted())
    }

    /// Makes votes visible. Calling it again while revealed changes
    /// nothing.
    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// Starts a new round on `text` (empty allowed): hides and clears
    /// every vote.
    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.current_prompt = text.into();
        self.reset_votes();
    }

    /// Hides and clears every vote, keeping the current prompt.
    pub fn reset_votes(&mut self) {
        self.revealed = false;
        for vote in self.votes.values_mut() {
            *vote = None;
        }
    }

    /// Detaches a participant and drops their vote.
    ///
    /// Returns `None` if the id is not attached; close and error signals
    /// for one connection may both arrive, and the second is a no-op.
    pub fn leave(
        &mut self,
        participant_id: &ParticipantId,
    ) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| &p.id == participant_id)?;
        self.votes.remove(participant_id);
        Some(self.participants.remove(index))
    }

    /// The room's identifier.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Attached participants in join order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Returns `true` if `participant_id` is attached.
    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.votes.contains_key(participant_id)
    }

    /// The item being estimated; empty when unset.
    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    /// Every attached participant's vote.
    pub fn votes(&self) -> &VoteMap {
        &self.votes
    }

    /// Whether votes are visible.
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// The current phase.
    pub fn phase(&self) -> RoomPhase {
        if self.revealed {
            RoomPhase::Revealed
        } else {
            RoomPhase::Voting
        }
    }

    /// Every attached participant has voted. An empty room never has.
    pub fn all_voted(&self) -> bool {
        !self.votes.is_empty() && self.votes.values().all(Option::is_some)
    }

    /// Returns `true` if nobody is attached.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Number of attached participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// A full copy of the room's state for a newly attached participant.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            players: self.participants.clone(),
            current_story: self.current_prompt.clone(),
            votes: self.votes.clone(),
            revealed: self.revealed,
        }
    }
}

/// Mints `p-<counter>-<8 hex chars>`. The counter alone guarantees
/// uniqueness; the random suffix keeps ids from being guessable in
/// sequence.
fn next_participant_id() -> ParticipantId {
    let n = NEXT_PARTICIPANT.fetch_add(1, Ordering::Relaxed);
    let suffix: u32 = rand::rng().random();
    ParticipantId(format!("p-{n}-{suffix:08x}"))
}

fn placeholder_name(id: &ParticipantId) -> String {
    let id = id.as_str();
    let tail = &id[id.len().saturating_sub(4)..];
    format!("Anon_{tail}")
}
