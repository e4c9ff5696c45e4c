use crate::segments::SegmentStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    User,
    Agent,
}

/// The voice session's speaking state. Owned by the external session; the
/// aggregator only reads transition edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Idle,
    Listening,
    Thinking,
    Speaking,
}

impl AgentState {
    fn is_speaking(self) -> bool {
        matches!(self, AgentState::Speaking)
    }
}

/// One uninterrupted speaking span of one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub participant: Participant,
    pub text: String,
    pub committed: bool,
}

/// Reduces the agent's state edges plus both participants' segment streams
/// into a two-party transcript: committed turns and one live turn per side.
///
/// Boundaries are driven by the agent's state because that is the only
/// start/stop-speaking signal that is authoritative and externally
/// observable; a user turn is whatever the user said since the agent last
/// spoke. Each participant's boundary is an explicit index into its segment
/// snapshot, advanced only at commit points.
#[derive(Debug)]
pub struct TurnAggregator {
    user_segments: SegmentStore,
    agent_segments: SegmentStore,
    user_boundary: usize,
    agent_boundary: usize,
    state: AgentState,
    turns: Vec<Turn>,
}

impl Default for TurnAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnAggregator {
    pub fn new() -> Self {
        Self {
            user_segments: SegmentStore::new(),
            agent_segments: SegmentStore::new(),
            user_boundary: 0,
            agent_boundary: 0,
            state: AgentState::Idle,
            turns: Vec::new(),
        }
    }

    /// Feeds one segment observation into the participant's store.
    pub fn observe_segment(&mut self, participant: Participant, id: &str, text: &str, is_final: bool) {
        match participant {
            Participant::User => self.user_segments.observe(id, text, is_final),
            Participant::Agent => self.agent_segments.observe(id, text, is_final),
        }
    }

    /// Applies an agent state update, evaluating speaking edges only.
    ///
    /// Duplicate states (no true transition) change no boundaries. Entering
    /// `Speaking` closes the pending user turn and opens the live agent turn;
    /// leaving `Speaking` closes the live agent turn.
    pub fn apply_state(&mut self, next: AgentState) {
        let prev = self.state;
        self.state = next;

        if next.is_speaking() && !prev.is_speaking() {
            self.commit(Participant::User);
            self.agent_boundary = self.agent_segments.len();
        }
        if !next.is_speaking() && prev.is_speaking() {
            self.commit(Participant::Agent);
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// The in-progress text for a participant: the snapshot suffix since its
    /// boundary, joined with single spaces and trimmed.
    pub fn live_text(&self, participant: Participant) -> String {
        let (store, boundary) = match participant {
            Participant::User => (&self.user_segments, self.user_boundary),
            Participant::Agent => (&self.agent_segments, self.agent_boundary),
        };
        store.snapshot()[boundary..].join(" ").trim().to_string()
    }

    /// The live turn, if any segments have accumulated since the boundary.
    pub fn live_turn(&self, participant: Participant) -> Option<Turn> {
        let text = self.live_text(participant);
        if text.is_empty() {
            return None;
        }
        Some(Turn {
            participant,
            text,
            committed: false,
        })
    }

    /// What a transcript view should show for a participant: the live text
    /// when non-empty, else the last committed turn. Gives a continuously
    /// updating typing effect without waiting for commit.
    pub fn display_text(&self, participant: Participant) -> String {
        let live = self.live_text(participant);
        if !live.is_empty() {
            return live;
        }
        self.last_committed(participant)
            .map(|turn| turn.text.clone())
            .unwrap_or_default()
    }

    pub fn last_committed(&self, participant: Participant) -> Option<&Turn> {
        self.turns
            .iter()
            .rev()
            .find(|turn| turn.participant == participant)
    }

    /// Committed turns in commit order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Clears all transcript state for an explicit session reset.
    pub fn reset(&mut self) {
        self.user_segments.clear();
        self.agent_segments.clear();
        self.user_boundary = 0;
        self.agent_boundary = 0;
        self.state = AgentState::Idle;
        self.turns.clear();
    }

    fn commit(&mut self, participant: Participant) {
        let text = self.live_text(participant);
        match participant {
            Participant::User => self.user_boundary = self.user_segments.len(),
            Participant::Agent => self.agent_boundary = self.agent_segments.len(),
        }
        // Empty spans commit nothing, never an empty turn.
        if !text.is_empty() {
            self.turns.push(Turn {
                participant,
                text,
                committed: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_commits_once_with_corrected_text() {
        let mut aggregator = TurnAggregator::new();
        aggregator.observe_segment(Participant::User, "seg-1", "book", false);
        aggregator.observe_segment(Participant::User, "seg-1", "a flight", true);

        aggregator.apply_state(AgentState::Listening);
        aggregator.apply_state(AgentState::Speaking);

        assert_eq!(
            aggregator.turns(),
            &[Turn {
                participant: Participant::User,
                text: "a flight".to_string(),
                committed: true,
            }]
        );
    }

    #[test]
    fn duplicate_state_events_commit_nothing_new() {
        let mut aggregator = TurnAggregator::new();
        aggregator.observe_segment(Participant::User, "u1", "hello", true);
        aggregator.apply_state(AgentState::Speaking);
        assert_eq!(aggregator.turns().len(), 1);

        // Same state again: no true edge, no boundary change.
        aggregator.observe_segment(Participant::User, "u2", "more", true);
        aggregator.apply_state(AgentState::Speaking);
        assert_eq!(aggregator.turns().len(), 1);

        // The buffered user segment survives until the next true edge.
        aggregator.apply_state(AgentState::Listening);
        aggregator.apply_state(AgentState::Speaking);
        assert_eq!(aggregator.turns().len(), 2);
        assert_eq!(aggregator.turns()[1].text, "more");
    }

    #[test]
    fn committed_turns_match_true_edges() {
        let mut aggregator = TurnAggregator::new();
        let mut user_id = 0;
        let mut agent_id = 0;

        let states = [
            AgentState::Idle,
            AgentState::Listening,
            AgentState::Listening,
            AgentState::Thinking,
            AgentState::Speaking, // edge 1: commits user
            AgentState::Speaking,
            AgentState::Listening, // edge 2: commits agent
            AgentState::Thinking,
            AgentState::Speaking, // edge 3: commits user
            AgentState::Idle,     // edge 4: commits agent
        ];

        for state in states {
            // Keep both spans non-empty so every true edge has text to commit.
            if aggregator.state().is_speaking() {
                agent_id += 1;
                aggregator.observe_segment(
                    Participant::Agent,
                    &format!("a{agent_id}"),
                    "agent words",
                    true,
                );
            } else {
                user_id += 1;
                aggregator.observe_segment(
                    Participant::User,
                    &format!("u{user_id}"),
                    "user words",
                    true,
                );
            }
            aggregator.apply_state(state);
        }

        assert_eq!(aggregator.turns().len(), 4);
    }

    #[test]
    fn agent_turn_closes_with_final_text_and_empty_live() {
        let mut aggregator = TurnAggregator::new();
        aggregator.apply_state(AgentState::Idle);
        aggregator.apply_state(AgentState::Listening);
        aggregator.apply_state(AgentState::Speaking);

        aggregator.observe_segment(Participant::Agent, "a1", "Hello", false);
        assert_eq!(aggregator.live_text(Participant::Agent), "Hello");
        aggregator.observe_segment(Participant::Agent, "a1", "Hello there", true);
        assert_eq!(aggregator.live_text(Participant::Agent), "Hello there");

        aggregator.apply_state(AgentState::Listening);

        let committed = aggregator
            .last_committed(Participant::Agent)
            .expect("agent turn should be committed");
        assert_eq!(committed.text, "Hello there");
        assert!(committed.committed);
        assert_eq!(aggregator.live_text(Participant::Agent), "");
        assert!(aggregator.live_turn(Participant::Agent).is_none());
    }

    #[test]
    fn empty_spans_are_omitted() {
        let mut aggregator = TurnAggregator::new();
        aggregator.apply_state(AgentState::Speaking);
        aggregator.apply_state(AgentState::Listening);
        aggregator.apply_state(AgentState::Speaking);
        aggregator.apply_state(AgentState::Idle);

        assert!(aggregator.turns().is_empty());
    }

    #[test]
    fn user_turn_joins_segments_in_first_seen_order() {
        let mut aggregator = TurnAggregator::new();
        aggregator.observe_segment(Participant::User, "u1", "what's the", false);
        aggregator.observe_segment(Participant::User, "u2", "weather today", true);
        aggregator.observe_segment(Participant::User, "u1", "what is the", true);

        aggregator.apply_state(AgentState::Speaking);

        assert_eq!(
            aggregator.last_committed(Participant::User).map(|t| t.text.as_str()),
            Some("what is the weather today")
        );
    }

    #[test]
    fn display_text_falls_back_to_last_committed() {
        let mut aggregator = TurnAggregator::new();
        aggregator.observe_segment(Participant::User, "u1", "show me flights", true);
        aggregator.apply_state(AgentState::Speaking);

        // No live user text after the boundary advanced.
        assert_eq!(aggregator.live_text(Participant::User), "");
        assert_eq!(aggregator.display_text(Participant::User), "show me flights");

        // A fresh segment switches display back to the live text.
        aggregator.observe_segment(Participant::User, "u2", "to Lisbon", false);
        assert_eq!(aggregator.display_text(Participant::User), "to Lisbon");
    }

    #[test]
    fn reset_clears_turns_segments_and_state() {
        let mut aggregator = TurnAggregator::new();
        aggregator.observe_segment(Participant::User, "u1", "hello", true);
        aggregator.apply_state(AgentState::Speaking);
        aggregator.observe_segment(Participant::Agent, "a1", "hi", true);
        aggregator.apply_state(AgentState::Listening);
        assert_eq!(aggregator.turns().len(), 2);

        aggregator.reset();
        assert!(aggregator.turns().is_empty());
        assert_eq!(aggregator.state(), AgentState::Idle);
        assert_eq!(aggregator.display_text(Participant::User), "");
        assert_eq!(aggregator.display_text(Participant::Agent), "");
    }
}
