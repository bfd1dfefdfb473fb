//! Convert command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{default_output_path, Orchestrator};
use anyhow::Result;

/// Convert one PDF into podcast audio without going through the HTTP API.
pub async fn run_convert(input: &str, output: Option<String>, settings: Settings) -> Result<()> {
    let input_path = Settings::expand_path(input);
    if !input_path.is_file() {
        Output::error(&format!("File not found: {}", input_path.display()));
        return Err(anyhow::anyhow!("File not found: {}", input_path.display()));
    }

    let output_path = output
        .map(|o| Settings::expand_path(&o))
        .unwrap_or_else(|| default_output_path(&input_path));

    Output::info(&format!("Processing: {}", input_path.display()));

    let orchestrator = Orchestrator::new(&settings)?;

    let spinner = Output::spinner("Extracting, summarizing and voicing...");
    let result = orchestrator.run(&input_path, &output_path).await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            Output::success(&format!("Podcast written to {}", outcome.output_path.display()));
            Output::kv("Characters extracted", &outcome.characters_extracted.to_string());
            Output::kv("Lines spoken", &outcome.synthesis.lines_spoken.to_string());
            if outcome.synthesis.lines_skipped > 0 {
                Output::kv("Lines skipped", &outcome.synthesis.lines_skipped.to_string());
            }
            Output::kv("Audio bytes", &outcome.synthesis.bytes_written.to_string());
            if outcome.synthesis.lines_spoken == 0 {
                Output::warning("The script had no recognized speaker lines; the audio file is empty.");
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to convert: {}", e));
            Output::info("Run 'chatcast doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    }

    Ok(())
}
