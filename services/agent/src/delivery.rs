//! Delivery sink over an in-process channel.
//!
//! The surrounding application hands the agent a ready pipe to the viewer;
//! here that pipe is a tokio mpsc channel of frames, consumed by whatever
//! transport the deployment provides. The demo binary logs the frames.

use anyhow::{bail, Result};
use async_trait::async_trait;
use glance_core::delivery::{DeliverySink, DeliveryStream};
use tokio::sync::mpsc;

/// One frame on the viewer pipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryFrame {
    Open { topic: String },
    Chunk { text: String },
    Close,
}

pub struct ChannelDelivery {
    frames: mpsc::Sender<DeliveryFrame>,
}

impl ChannelDelivery {
    pub fn new(frames: mpsc::Sender<DeliveryFrame>) -> Self {
        Self { frames }
    }
}

#[async_trait]
impl DeliverySink for ChannelDelivery {
    async fn open(&self, topic: &str) -> Result<Box<dyn DeliveryStream>> {
        self.frames
            .send(DeliveryFrame::Open {
                topic: topic.to_string(),
            })
            .await
            .map_err(|_| anyhow::anyhow!("viewer pipe closed"))?;
        Ok(Box::new(ChannelStream {
            frames: self.frames.clone(),
            closed: false,
        }))
    }
}

struct ChannelStream {
    frames: mpsc::Sender<DeliveryFrame>,
    closed: bool,
}

#[async_trait]
impl DeliveryStream for ChannelStream {
    async fn write(&mut self, chunk: &str) -> Result<()> {
        if self.closed {
            bail!("write after close on viewer pipe");
        }
        self.frames
            .send(DeliveryFrame::Chunk {
                text: chunk.to_string(),
            })
            .await
            .map_err(|_| anyhow::anyhow!("viewer pipe closed"))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            bail!("delivery stream closed twice");
        }
        self.closed = true;
        self.frames
            .send(DeliveryFrame::Close)
            .await
            .map_err(|_| anyhow::anyhow!("viewer pipe closed"))
    }
}
