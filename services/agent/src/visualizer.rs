//! Streaming client for the panel-generation backend.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint with `stream:
//! true` and exposes the delta stream through the `PanelGenerator` trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use glance_core::generator::{ChunkStream, PanelGenerator};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// The voice LLM decides WHAT to show; the visualizer model turns that
/// content into the rendered component.
const SYSTEM_PROMPT: &str = "You are being used in tandem with a voice agent. \
The voice agent LLM decides what to show on the screen and calls you with the content to generate a visual UI. \
The content will be passed as the user message and your job is to convert that content into a visually appealing and interactive UI component.";

#[derive(Debug, Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

pub struct VisualizerClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl VisualizerClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model,
        }
    }
}

/// Extracts the text delta from one server-sent-event line, if it carries one.
fn delta_from_line(line: &str) -> Option<String> {
    let payload = line.trim().strip_prefix("data: ")?;
    if payload == "[DONE]" {
        return None;
    }
    match serde_json::from_str::<StreamResponse>(payload) {
        Ok(response) => response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty()),
        Err(e) => {
            tracing::debug!("skipping unparseable stream line: {}", e);
            None
        }
    }
}

#[async_trait]
impl PanelGenerator for VisualizerClient {
    async fn generate(&self, content: &str, cancel: CancellationToken) -> Result<ChunkStream> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": content }
            ],
            "stream": true
        });

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                anyhow::bail!("generation superseded before the request was sent")
            }
            response = request.send() => {
                response.context("visualizer request failed")?
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            anyhow::bail!("visualizer request failed with status {}: {}", status, body);
        }

        // Buffer partial SSE lines across network chunks and emit one item
        // per complete `data:` line that carries a delta. `take_until` ends
        // the stream as soon as the token fires so a superseded generation
        // stops pulling bytes.
        let deltas = response
            .bytes_stream()
            .scan(String::new(), |buffer, chunk| {
                let mut out: Vec<Result<String>> = Vec::new();
                match chunk {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));
                        let mut consumed = 0;
                        for (idx, _) in buffer.match_indices('\n') {
                            if let Some(delta) = delta_from_line(&buffer[consumed..idx]) {
                                out.push(Ok(delta));
                            }
                            consumed = idx + 1;
                        }
                        *buffer = buffer[consumed..].to_string();
                    }
                    Err(e) => out.push(Err(anyhow::Error::new(e))),
                }
                futures::future::ready(Some(stream::iter(out)))
            })
            .flatten()
            .take_until(cancel.cancelled_owned());

        Ok(Box::pin(deltas))
    }
}
