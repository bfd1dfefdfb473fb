//! Murf streaming text-to-speech client.

use super::{AudioStream, SpeechClient};
use crate::config::TtsSettings;
use crate::error::{ChatcastError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tracing::{debug, instrument};

/// Client for Murf's `speech/stream` endpoint.
pub struct MurfClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    format: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    format: &'a str,
}

impl MurfClient {
    /// Create a client from settings and an API key.
    pub fn new(settings: &TtsSettings, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/speech/stream", settings.api_base.trim_end_matches('/')),
            api_key: api_key.to_string(),
            format: settings.format.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechClient for MurfClient {
    #[instrument(skip(self, text), fields(voice = %voice_id, chars = text.len()))]
    async fn stream(&self, text: &str, voice_id: &str) -> Result<AudioStream> {
        let request = StreamRequest {
            text,
            voice_id,
            format: &self.format,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatcastError::Synthesis(format!("Failed to reach Murf: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatcastError::Synthesis(format!(
                "Murf API error: {} - {}",
                status, body
            )));
        }

        debug!("Streaming audio for voice {}", voice_id);

        let stream = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| ChatcastError::Synthesis(format!("Audio stream interrupted: {}", e)))
        });

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base() {
        let settings = TtsSettings {
            api_base: "https://api.murf.ai/v1/".to_string(),
            ..TtsSettings::default()
        };
        let client = MurfClient::new(&settings, "key");
        assert_eq!(client.endpoint(), "https://api.murf.ai/v1/speech/stream");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(StreamRequest {
            text: "Welcome!",
            voice_id: "en-US-natalie",
            format: "WAV",
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"text": "Welcome!", "voiceId": "en-US-natalie", "format": "WAV"})
        );
    }
}
