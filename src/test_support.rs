//! In-process stand-ins for the external services, used by unit tests.

use crate::error::{ChatcastError, Result};
use crate::extract::TextExtractor;
use crate::llm::LanguageModel;
use crate::tts::{AudioStream, SpeechClient};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Language model that replays queued replies and records every prompt.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Recorded `(system, user)` prompts.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatcastError::LanguageModel("no scripted reply".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Speech client that "speaks" `<voice:text>` as bytes.
pub struct FakeSpeech {
    requests: Mutex<Vec<(String, String)>>,
    chunk_size: Option<usize>,
    fail_on: Option<usize>,
}

impl FakeSpeech {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            chunk_size: None,
            fail_on: None,
        }
    }

    /// Deliver each line's audio in chunks of `size` bytes.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Fail the `n`th request (1-based).
    pub fn failing_on_request(mut self, n: usize) -> Self {
        self.fail_on = Some(n);
        self
    }

    /// Recorded `(text, voice_id)` requests.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechClient for FakeSpeech {
    async fn stream(&self, text: &str, voice_id: &str) -> Result<AudioStream> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push((text.to_string(), voice_id.to_string()));
            requests.len()
        };

        if self.fail_on == Some(count) {
            return Err(ChatcastError::Synthesis("voice service unavailable".to_string()));
        }

        let audio = format!("<{}:{}>", voice_id, text).into_bytes();
        let chunks: Vec<Result<Vec<u8>>> = match self.chunk_size {
            Some(size) => audio.chunks(size).map(|c| Ok(c.to_vec())).collect(),
            None => vec![Ok(audio)],
        };
        Ok(futures::stream::iter(chunks).boxed())
    }
}

/// Extractor returning fixed text, or an error when built with `failing`.
pub struct StaticExtractor {
    text: Option<String>,
}

impl StaticExtractor {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        self.text.clone().ok_or_else(|| {
            ChatcastError::Extraction(format!("Corrupt PDF {}", path.display()))
        })
    }
}
