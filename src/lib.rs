//! ChatCast - research papers as podcast conversations
//!
//! Turns a PDF into a two-speaker audio conversation.
//!
//! # Overview
//!
//! A document moves through four stages:
//! - Text is extracted from the PDF
//! - The text is split into overlapping chunks and summarized by a language model
//! - The summary is rewritten as a host/expert dialogue script
//! - Each dialogue line is voiced by a text-to-speech service and appended to one audio file
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `extract` - PDF text extraction
//! - `chunking` - Recursive character text splitting
//! - `llm` - Language model access
//! - `summarize` - Chunked summarization
//! - `script` - Summary to dialogue style transfer
//! - `dialogue` - Speaker labels and script parsing
//! - `tts` - Text-to-speech clients
//! - `synthesis` - Script to audio file
//! - `pipeline` - Per-job stage state
//! - `orchestrator` - Pipeline coordination
//! - `jobs` - Background job tracking for the HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use chatcast::config::Settings;
//! use chatcast::orchestrator::{default_output_path, Orchestrator};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let input = Path::new("paper.pdf");
//!     let outcome = orchestrator.run(input, &default_output_path(input)).await?;
//!     println!("Spoke {} lines", outcome.synthesis.lines_spoken);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod pipeline;
pub mod script;
pub mod summarize;
pub mod synthesis;
pub mod tts;

#[cfg(test)]
mod test_support;

pub use error::{ChatcastError, Result};
