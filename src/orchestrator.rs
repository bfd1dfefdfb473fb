//! Pipeline orchestrator for ChatCast.
//!
//! Coordinates the entire process from PDF text extraction to podcast audio.

use crate::chunking::{ChunkingConfig, TextSplitter};
use crate::config::{Credentials, Prompts, Settings};
use crate::dialogue::SpeakerTable;
use crate::error::{ChatcastError, Result};
use crate::extract::{PdfiumExtractor, TextExtractor};
use crate::llm::{ChatModel, LanguageModel};
use crate::pipeline::PipelineState;
use crate::script::ScriptWriter;
use crate::summarize::Summarizer;
use crate::synthesis::{SpeechSynthesizer, SynthesisReport};
use crate::tts::{MurfClient, SpeechClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the ChatCast pipeline.
///
/// Holds no per-job state, so one instance can run any number of jobs
/// concurrently.
pub struct Orchestrator {
    credentials: Credentials,
    extractor: Arc<dyn TextExtractor>,
    summarizer: Summarizer,
    script_writer: ScriptWriter,
    synthesizer: SpeechSynthesizer,
}

impl Orchestrator {
    /// Create an orchestrator with the default pdfium, chat and Murf backends.
    ///
    /// Missing credentials are not reported here; every job checks them
    /// before its first stage.
    pub fn new(settings: &Settings) -> Result<Self> {
        let credentials = Credentials::from_settings(settings);

        let extractor: Arc<dyn TextExtractor> =
            Arc::new(PdfiumExtractor::with_library_dir(settings.pdfium_library_dir()));
        let model: Arc<dyn LanguageModel> = Arc::new(ChatModel::new(
            &settings.llm,
            credentials.llm_api_key.as_deref().unwrap_or_default(),
        )?);
        let speech: Arc<dyn SpeechClient> = Arc::new(MurfClient::new(
            &settings.tts,
            credentials.tts_api_key.as_deref().unwrap_or_default(),
        ));

        Self::with_components(settings, credentials, extractor, model, speech)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: &Settings,
        credentials: Credentials,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn LanguageModel>,
        speech: Arc<dyn SpeechClient>,
    ) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let splitter = TextSplitter::new(ChunkingConfig {
            chunk_size: settings.summarize.chunk_size,
            chunk_overlap: settings.summarize.chunk_overlap,
        })?;

        let summarizer = Summarizer::new(model.clone(), splitter).with_prompts(prompts.clone());
        let script_writer =
            ScriptWriter::new(model, settings.script.clone()).with_prompts(prompts);
        let synthesizer = SpeechSynthesizer::new(
            speech,
            SpeakerTable::from_settings(&settings.script, &settings.tts)?,
        );

        Ok(Self {
            credentials,
            extractor,
            summarizer,
            script_writer,
            synthesizer,
        })
    }

    /// Convert the document at `document_path` into podcast audio at `output_path`.
    #[instrument(skip(self), fields(document = %document_path.display()))]
    pub async fn run(&self, document_path: &Path, output_path: &Path) -> Result<PodcastOutcome> {
        self.credentials.require()?;

        info!("Extracting text...");
        let raw_text = self.extractor.extract(document_path).await?;
        if raw_text.trim().is_empty() {
            return Err(ChatcastError::EmptyDocument);
        }
        let characters_extracted = raw_text.chars().count();
        let state = PipelineState::new(raw_text);

        info!("Summarizing {} characters...", characters_extracted);
        let summary = self.summarizer.summarize(state.raw_text()).await?;
        let state = state.with_summary(summary)?;

        info!("Writing dialogue script...");
        let script = self.script_writer.style_transfer(state.summary()).await?;
        let state = state.with_script(script)?;

        info!("Synthesizing audio...");
        let report = self.synthesizer.synthesize(state.script(), output_path).await?;

        Ok(PodcastOutcome {
            output_path: output_path.to_path_buf(),
            characters_extracted,
            synthesis: report,
        })
    }
}

/// Default output location for a document: same path, `.wav` extension.
pub fn default_output_path(document_path: &Path) -> PathBuf {
    document_path.with_extension("wav")
}

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct PodcastOutcome {
    /// Where the audio was written.
    pub output_path: PathBuf,
    /// Characters of text extracted from the document.
    pub characters_extracted: usize,
    /// Per-line synthesis counts.
    pub synthesis: SynthesisReport,
}
