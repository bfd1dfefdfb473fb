//! State threaded through the pipeline stages.

use crate::error::{ChatcastError, Result};

/// How far a [`PipelineState`] has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Extracted,
    Summarized,
    Scripted,
}

/// Text produced so far for one job.
///
/// Fields fill strictly in order: raw text, then summary, then script. Each
/// transition consumes the old value and returns a new one, so a field can
/// no longer change once a later stage has been recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    raw_text: String,
    summary: String,
    script: String,
}

impl PipelineState {
    /// Start a pipeline from extracted document text.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            summary: String::new(),
            script: String::new(),
        }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn stage(&self) -> Stage {
        if !self.script.is_empty() {
            Stage::Scripted
        } else if !self.summary.is_empty() {
            Stage::Summarized
        } else {
            Stage::Extracted
        }
    }

    /// Record the summary. Requires raw text and no script yet.
    pub fn with_summary(self, summary: impl Into<String>) -> Result<Self> {
        if self.raw_text.trim().is_empty() {
            return Err(ChatcastError::Pipeline(
                "cannot summarize before text is extracted".to_string(),
            ));
        }
        if self.stage() == Stage::Scripted {
            return Err(ChatcastError::Pipeline(
                "summary already consumed by the script stage".to_string(),
            ));
        }

        Ok(Self {
            raw_text: self.raw_text,
            summary: summary.into(),
            script: String::new(),
        })
    }

    /// Record the script. Requires a summary.
    pub fn with_script(self, script: impl Into<String>) -> Result<Self> {
        if self.summary.trim().is_empty() {
            return Err(ChatcastError::Pipeline(
                "cannot write a script before the summary exists".to_string(),
            ));
        }

        Ok(Self {
            raw_text: self.raw_text,
            summary: self.summary,
            script: script.into(),
        })
    }
}
