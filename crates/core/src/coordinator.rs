use crate::delivery::DeliverySink;
use crate::generator::PanelGenerator;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Spoken acknowledgment returned to the caller while the panel streams in
/// the background.
pub const DEFAULT_ACK: &str =
    "The panel is loading on screen. Tell the user in one or two natural sentences what you are showing them.";

/// Cancellation signal and completion state of the one active generation.
///
/// Owned exclusively by the coordinator and replaced wholesale on
/// supersession, so every background task only ever checks the token it
/// captured at start. Destroyed when superseded or completed.
struct GenerationHandle {
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

/// Serializes visualization requests into a single logical output stream per
/// topic, with cancel-and-replace semantics.
///
/// `request` returns before the stream finishes: the caller gets an
/// acknowledgment to speak immediately while a detached task delivers the
/// panel chunks. A new request supersedes the one in flight; cancellation is
/// cooperative and idempotent.
pub struct GenerationCoordinator {
    topic: String,
    ack: String,
    generator: Arc<dyn PanelGenerator>,
    delivery: Arc<dyn DeliverySink>,
    active: Mutex<Option<GenerationHandle>>,
}

impl GenerationCoordinator {
    pub fn new(
        topic: impl Into<String>,
        generator: Arc<dyn PanelGenerator>,
        delivery: Arc<dyn DeliverySink>,
    ) -> Self {
        Self {
            topic: topic.into(),
            ack: DEFAULT_ACK.to_string(),
            generator,
            delivery,
            active: Mutex::new(None),
        }
    }

    /// Overrides the spoken acknowledgment, e.g. for localized narration.
    pub fn with_ack(mut self, ack: impl Into<String>) -> Self {
        self.ack = ack.into();
        self
    }

    /// Supersedes any in-flight generation and starts streaming `content` to
    /// the topic in the background.
    ///
    /// The previous generation is cancelled before the new one starts, and
    /// the new task waits for the superseded stream to close before opening
    /// its own, so the channel carries at most one open stream per topic and
    /// never sees a stale chunk after the new open. The whole
    /// cancel-then-replace happens under one lock acquisition: there is no
    /// window where two generations are both considered current.
    pub fn request(&self, content: String) -> String {
        let cancel = CancellationToken::new();
        let mut active = self.lock_active();

        let superseded = active.take();
        if let Some(handle) = &superseded {
            handle.cancel.cancel();
        }

        let generator = Arc::clone(&self.generator);
        let delivery = Arc::clone(&self.delivery);
        let topic = self.topic.clone();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            if let Some(handle) = superseded {
                if let Err(e) = handle.task.await {
                    tracing::warn!("superseded generation task did not join cleanly: {:?}", e);
                }
            }
            stream_panel(generator, delivery, topic, content, task_cancel).await;
        });

        *active = Some(GenerationHandle { cancel, task });
        self.ack.clone()
    }

    /// Cancels the in-flight generation, if any. Signaling an already
    /// completed or cancelled generation is a no-op.
    pub fn cancel_active(&self) {
        if let Some(handle) = self.lock_active().as_ref() {
            handle.cancel.cancel();
        }
    }

    /// Whether a generation is still delivering chunks.
    pub fn is_active(&self) -> bool {
        self.lock_active()
            .as_ref()
            .is_some_and(|handle| !handle.task.is_finished())
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<GenerationHandle>> {
        // The slot holds only a token/handle pair whose invariants cannot be
        // torn, so a poisoned lock is safe to recover.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background delivery task for one generation.
///
/// Pulls chunks in arrival order and re-checks its own token before every
/// write; once the token fires it stops consuming and drops the rest. The
/// opened stream is closed on every exit path. Generator and channel
/// failures are terminal for this one generation only: the caller already
/// has its acknowledgment, so they are logged and contained here.
async fn stream_panel(
    generator: Arc<dyn PanelGenerator>,
    delivery: Arc<dyn DeliverySink>,
    topic: String,
    content: String,
    cancel: CancellationToken,
) {
    let mut stream = match delivery.open(&topic).await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!("failed to open delivery stream for topic {:?}: {:?}", topic, e);
            return;
        }
    };

    match generator.generate(&content, cancel.clone()).await {
        Ok(mut chunks) => {
            let mut written = 0usize;
            loop {
                let chunk = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("generation for topic {:?} superseded, dropping remaining chunks", topic);
                        break;
                    }
                    chunk = chunks.next() => match chunk {
                        Some(chunk) => chunk,
                        None => break,
                    },
                };
                match chunk {
                    Ok(text) => {
                        written += text.len();
                        if let Err(e) = stream.write(&text).await {
                            tracing::warn!("failed to write panel chunk: {:?}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        if !cancel.is_cancelled() {
                            tracing::error!("panel generation failed mid-stream: {:?}", e);
                        }
                        break;
                    }
                }
            }
            tracing::debug!("streamed {} chars to topic {:?}", written, topic);
        }
        Err(e) => {
            if !cancel.is_cancelled() {
                tracing::error!("panel generation failed to start: {:?}", e);
            }
        }
    }

    if let Err(e) = stream.close().await {
        tracing::warn!("failed to close delivery stream for topic {:?}: {:?}", topic, e);
    }
}
