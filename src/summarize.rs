//! Section-wise summarization of extracted document text.

use crate::chunking::TextSplitter;
use crate::config::Prompts;
use crate::error::{ChatcastError, Result};
use crate::llm::LanguageModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Produces a bulleted, section-wise summary with a single model call.
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
    splitter: TextSplitter,
    prompts: Prompts,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>, splitter: TextSplitter) -> Self {
        Self {
            model,
            splitter,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Split `text` into overlapping chunks and summarize them in one prompt.
    ///
    /// The model's reply is returned as-is. An error or an empty reply fails
    /// with `Summarization`; nothing is retried.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let chunks = self.splitter.split(text);
        if chunks.is_empty() {
            return Err(ChatcastError::Summarization("no text to summarize".to_string()));
        }
        info!("Summarizing {} chunks with {}", chunks.len(), self.model.model_name());

        let mut vars = HashMap::new();
        vars.insert("text".to_string(), format_chunks(&chunks));
        vars.insert("chunk_count".to_string(), chunks.len().to_string());

        let system = self.prompts.render_with_custom(&self.prompts.summarize.system, &vars);
        let user = self.prompts.render_with_custom(&self.prompts.summarize.user, &vars);

        let summary = self
            .model
            .complete(&system, &user)
            .await
            .map_err(|e| ChatcastError::Summarization(e.to_string()))?;

        if summary.trim().is_empty() {
            return Err(ChatcastError::Summarization(
                "Empty response from language model".to_string(),
            ));
        }

        Ok(summary)
    }
}

/// Lay chunks out one after another, each under a numbered marker.
fn format_chunks(chunks: &[String]) -> String {
    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[Chunk {}]\n{}", i + 1, chunk))
        .collect::<Vec<_>>()
        .join("\n\n")
}
