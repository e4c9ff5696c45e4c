//! Application Configuration Module
//!
//! This module centralizes the configuration for the glance agent. It loads
//! settings from environment variables and provides a single, shareable
//! struct that can be passed throughout the application.

use std::env;
use tracing::Level;

/// Topic the generated panel stream is published on by default.
pub const DEFAULT_PANEL_TOPIC: &str = "genui";

const DEFAULT_BASE_URL: &str = "https://api.thesys.dev/v1/embed";
const DEFAULT_MODEL: &str = "c1/google/gemini-3-flash/v-20251230";

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub visualizer_api_key: String,
    pub visualizer_base_url: String,
    pub visualizer_model: String,
    pub panel_topic: String,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `VISUALIZER_API_KEY`: Secret key for the panel-generation API. Required.
    // *   `VISUALIZER_BASE_URL`: (Optional) OpenAI-compatible endpoint base. Defaults to the hosted visualizer.
    // *   `VISUALIZER_MODEL`: (Optional) Model used to render panel content.
    // *   `PANEL_TOPIC`: (Optional) Delivery topic for panel streams. Defaults to "genui".
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();

        let visualizer_api_key = env::var("VISUALIZER_API_KEY")
            .map_err(|_| ConfigError::MissingVar("VISUALIZER_API_KEY".to_string()))?;

        let visualizer_base_url =
            env::var("VISUALIZER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let visualizer_model =
            env::var("VISUALIZER_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let panel_topic =
            env::var("PANEL_TOPIC").unwrap_or_else(|_| DEFAULT_PANEL_TOPIC.to_string());

        // Configure logging level from RUST_LOG, with a sensible default.
        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            visualizer_api_key,
            visualizer_base_url,
            visualizer_model,
            panel_topic,
            log_level,
        })
    }
}
