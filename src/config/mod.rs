//! Configuration module for ChatCast.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, ScriptPrompts, SummarizePrompts};
pub use settings::{
    Credentials, GeneralSettings, LlmSettings, PromptSettings, ScriptSettings, ServerSettings,
    Settings, SummarizeSettings, TtsSettings,
};
