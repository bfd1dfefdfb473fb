//! Language model access for the summarize and script stages.

mod chat;

pub use chat::ChatModel;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text completion backends.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a system and user message and return the text of the reply.
    async fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
