use anyhow::Result;
use async_trait::async_trait;
use futures::stream::Stream;
#[cfg(test)]
use mockall::automock;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// Incremental output of one generation call.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// A streaming text-generation backend that renders panel content.
///
/// The returned stream is finite: it terminates on its own or once the token
/// is cancelled. Implementations must stop producing promptly after
/// cancellation; the coordinator stops pulling as soon as it observes the
/// signal.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PanelGenerator: Send + Sync {
    async fn generate(&self, content: &str, cancel: CancellationToken) -> Result<ChunkStream>;
}
