//! Text-to-speech providers.

mod murf;

pub use murf::MurfClient;

use crate::error::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Audio returned by a streaming synthesis call, in arrival order.
pub type AudioStream = BoxStream<'static, Result<Vec<u8>>>;

/// Trait for streaming speech synthesis.
#[async_trait]
pub trait SpeechClient: Send + Sync {
    /// Start synthesizing `text` with `voice_id` and return the audio chunks.
    async fn stream(&self, text: &str, voice_id: &str) -> Result<AudioStream>;
}
