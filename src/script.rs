//! Style transfer from an academic summary to a two-speaker podcast script.

use crate::config::{Prompts, ScriptSettings};
use crate::error::{ChatcastError, Result};
use crate::llm::LanguageModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Rewrites a summary as a Host/Expert dialogue.
pub struct ScriptWriter {
    model: Arc<dyn LanguageModel>,
    personas: ScriptSettings,
    prompts: Prompts,
}

impl ScriptWriter {
    pub fn new(model: Arc<dyn LanguageModel>, personas: ScriptSettings) -> Self {
        Self {
            model,
            personas,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Produce the dialogue script for `summary`.
    ///
    /// The reply is not validated here; lines without a known speaker label
    /// are dropped later by the synthesizer.
    #[instrument(skip(self, summary), fields(chars = summary.len()))]
    pub async fn style_transfer(&self, summary: &str) -> Result<String> {
        info!(
            "Writing {}/{} script with {}",
            self.personas.host_name,
            self.personas.expert_name,
            self.model.model_name()
        );

        let mut vars = HashMap::new();
        vars.insert("summary".to_string(), summary.to_string());
        vars.insert("podcast_name".to_string(), self.personas.podcast_name.clone());
        vars.insert("host_name".to_string(), self.personas.host_name.clone());
        vars.insert("expert_name".to_string(), self.personas.expert_name.clone());

        let system = self.prompts.render_with_custom(&self.prompts.script.system, &vars);
        let user = self.prompts.render_with_custom(&self.prompts.script.user, &vars);

        let script = self
            .model
            .complete(&system, &user)
            .await
            .map_err(|e| ChatcastError::ScriptGeneration(e.to_string()))?;

        if script.trim().is_empty() {
            return Err(ChatcastError::ScriptGeneration(
                "Empty response from language model".to_string(),
            ));
        }

        Ok(script)
    }
}
