pub mod coordinator;
pub mod delivery;
pub mod events;
pub mod generator;
pub mod segments;
pub mod turns;

pub use coordinator::GenerationCoordinator;
pub use events::{Command, SessionEvent};
pub use segments::SegmentStore;
pub use turns::{AgentState, Participant, Turn, TurnAggregator};
