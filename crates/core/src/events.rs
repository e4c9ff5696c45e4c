use crate::turns::{AgentState, Participant};
use serde::{Deserialize, Serialize};

/// Inputs the surrounding voice session feeds into the agent loop.
///
/// Delivered as an ordered sequence per participant; there is no ordering
/// guarantee across participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    AgentStateChanged {
        state: AgentState,
    },
    Segment {
        participant: Participant,
        /// Segment id, or the stream-level id when the provider omits one.
        /// With the fallback key, dedup degrades to arrival order.
        id: String,
        text: String,
        #[serde(default)]
        is_final: bool,
    },
    /// Render the given content as a visual panel.
    ShowPanel {
        content: String,
    },
    /// Explicit end/reset from the surrounding application: clears the
    /// transcript and cancels any in-flight generation.
    Reset,
}

/// Side effects the session asks the runtime to perform.
#[derive(Debug, Clone)]
pub enum Command {
    /// Speak the given text to the user.
    Speak(String),
}
