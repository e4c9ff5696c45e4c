//! Session event loop.
//!
//! One task per conversation consumes the ordered event stream from the
//! voice transport, feeds the turn aggregator, and dispatches panel requests
//! to the generation coordinator. Everything here is synchronous apart from
//! forwarding commands; the coordinator does its own background streaming.

use glance_core::{Command, GenerationCoordinator, SessionEvent, TurnAggregator};
use tokio::sync::mpsc;

pub struct Session {
    transcript: TurnAggregator,
    coordinator: GenerationCoordinator,
    command_tx: mpsc::Sender<Command>,
}

impl Session {
    pub fn new(coordinator: GenerationCoordinator, command_tx: mpsc::Sender<Command>) -> Self {
        Self {
            transcript: TurnAggregator::new(),
            coordinator,
            command_tx,
        }
    }

    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AgentStateChanged { state } => {
                self.transcript.apply_state(state);
                tracing::debug!("agent state: {:?}", state);
            }
            SessionEvent::Segment {
                participant,
                id,
                text,
                is_final,
            } => {
                self.transcript
                    .observe_segment(participant, &id, &text, is_final);
                tracing::debug!(
                    "[{:?}] {}",
                    participant,
                    self.transcript.display_text(participant)
                );
            }
            SessionEvent::ShowPanel { content } => {
                tracing::info!("visualizing ({} chars)", content.len());
                let ack = self.coordinator.request(content);
                if let Err(e) = self.command_tx.send(Command::Speak(ack)).await {
                    tracing::error!("failed to send speak command: {:?}", e);
                }
            }
            SessionEvent::Reset => {
                self.coordinator.cancel_active();
                self.transcript.reset();
                tracing::info!("session reset");
            }
        }
    }

    pub fn transcript(&self) -> &TurnAggregator {
        &self.transcript
    }
}

/// Receives and processes events until the transport closes the channel.
pub async fn run(mut session: Session, mut events: mpsc::Receiver<SessionEvent>) {
    while let Some(event) = events.recv().await {
        session.handle_event(event).await;
    }
    tracing::info!("event stream ended, session loop exiting");
}
