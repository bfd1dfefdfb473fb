//! OpenAI-compatible client construction.
//!
//! The default endpoint is Google's OpenAI-compatible Gemini API, so the same
//! client works against OpenAI itself or any other compatible server.

use crate::config::LlmSettings;
use crate::error::{ChatcastError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a chat client for the configured endpoint and key.
///
/// No request timeout is applied unless `request_timeout_secs` is set.
pub fn create_client(settings: &LlmSettings, api_key: &str) -> Result<Client<OpenAIConfig>> {
    let config = OpenAIConfig::new()
        .with_api_base(settings.api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = settings.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let http_client = builder
        .build()
        .map_err(|e| ChatcastError::Config(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
