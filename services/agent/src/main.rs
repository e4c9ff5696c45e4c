mod config;
mod delivery;
mod session;
mod visualizer;

use crate::config::Config;
use crate::delivery::{ChannelDelivery, DeliveryFrame};
use crate::visualizer::VisualizerClient;
use anyhow::{Context, Result};
use clap::Parser;
use glance_core::{Command, GenerationCoordinator, SessionEvent};
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser)]
struct Cli {
    /// Override the panel delivery topic from configuration.
    #[arg(long)]
    topic: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting glance agent...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();
    let topic = args.topic.unwrap_or_else(|| config.panel_topic.clone());

    // --- 4. Wire the Core ---
    let generator = Arc::new(VisualizerClient::new(
        config.visualizer_api_key.clone(),
        config.visualizer_base_url.clone(),
        config.visualizer_model.clone(),
    ));
    let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel::<DeliveryFrame>(256);
    let delivery = Arc::new(ChannelDelivery::new(frame_tx));

    let (event_tx, event_rx) = tokio::sync::mpsc::channel::<SessionEvent>(1024);
    let (command_tx, mut command_rx) = tokio::sync::mpsc::channel::<Command>(32);

    let coordinator = GenerationCoordinator::new(topic, generator, delivery);
    let session = session::Session::new(coordinator, command_tx);

    // Voice-session stand-in: session events arrive as JSON lines on stdin.
    // A deployment feeds the same channel from its voice transport instead.
    let event_driver = tokio::spawn(async move {
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<SessionEvent>(line) {
                        Ok(event) => {
                            if event_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!("ignoring malformed session event: {}", e),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("failed to read session event: {:?}", e);
                    break;
                }
            }
        }
    });

    let session_handle = tokio::spawn(session::run(session, event_rx));

    // This task handles commands from the core logic, executing side effects.
    // The demo logs the spoken acknowledgment; a deployment forwards it to TTS.
    let command_handler = tokio::spawn(async move {
        while let Some(command) = command_rx.recv().await {
            match command {
                Command::Speak(text) => {
                    tracing::info!("COMMAND RECEIVED: Speak: '{}'", text);
                }
            }
        }
    });

    // Panel frame consumer: forwards the generated stream to the viewer
    // transport. The demo logs frame boundaries and chunk sizes.
    let frame_consumer = tokio::spawn(async move {
        while let Some(frame) = frame_rx.recv().await {
            match frame {
                DeliveryFrame::Open { topic } => {
                    tracing::info!("panel stream opened on topic {:?}", topic)
                }
                DeliveryFrame::Chunk { text } => {
                    tracing::debug!("panel chunk ({} chars)", text.len())
                }
                DeliveryFrame::Close => tracing::info!("panel stream closed"),
            }
        }
    });

    tokio::select! {
        _ = event_driver => {},
        _ = session_handle => {},
        _ = command_handler => {},
        _ = frame_consumer => {},
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down...");
        }
    }
    tracing::info!("Shutting down...");
    Ok(())
}
