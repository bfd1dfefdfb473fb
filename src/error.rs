//! Error types for ChatCast.

use thiserror::Error;

/// Library-level error type for ChatCast operations.
///
/// The stage variants (`Extraction` through `Synthesis`) abort a job; their
/// `Display` output is what a failed job reports to status pollers.
#[derive(Error, Debug)]
pub enum ChatcastError {
    #[error("{0} environment variable not set")]
    MissingCredential(String),

    #[error("Failed to read document: {0}")]
    Extraction(String),

    #[error("No text could be extracted from the PDF")]
    EmptyDocument,

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Script generation failed: {0}")]
    ScriptGeneration(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Language model request failed: {0}")]
    LanguageModel(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for ChatCast operations.
pub type Result<T> = std::result::Result<T, ChatcastError>;
