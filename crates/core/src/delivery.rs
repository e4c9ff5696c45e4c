use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// An ordered, per-topic text pipe to the remote viewer.
///
/// The surrounding application decides what actually carries the bytes; the
/// core only requires open/write/close. Writing after close is the sink's
/// error to raise, and the coordinator guarantees it never does so itself:
/// every stream it opens is closed exactly once, on the success, cancellation
/// and error paths alike.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn open(&self, topic: &str) -> Result<Box<dyn DeliveryStream>>;
}

/// One open stream on a delivery topic. Chunks are written in order.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DeliveryStream: Send {
    async fn write(&mut self, chunk: &str) -> Result<()>;
    async fn close(&mut self) -> Result<()>;
}
