//! Speech synthesis of a dialogue script into one audio file.
//!
//! Each recognized script line becomes one streaming TTS request; the audio
//! chunks are appended to the output file in arrival order. The result is a
//! raw concatenation with no mixing or normalization.

use crate::dialogue::SpeakerTable;
use crate::error::{ChatcastError, Result};
use crate::tts::SpeechClient;
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

/// Counts describing one synthesis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Lines sent to the speech provider.
    pub lines_spoken: usize,
    /// Non-blank lines without a recognized speaker label.
    pub lines_skipped: usize,
    /// Audio bytes appended to the output file.
    pub bytes_written: u64,
}

/// Turns a script into audio, line by line.
pub struct SpeechSynthesizer {
    client: Arc<dyn SpeechClient>,
    speakers: SpeakerTable,
}

impl SpeechSynthesizer {
    pub fn new(client: Arc<dyn SpeechClient>, speakers: SpeakerTable) -> Self {
        Self { client, speakers }
    }

    /// Synthesize `script` into `output_path`.
    ///
    /// Any existing file at `output_path` is replaced, so running twice leaves
    /// only the second run's audio. A failed request aborts the pass; audio
    /// already written for earlier lines stays in the file.
    #[instrument(skip(self, script), fields(output = %output_path.display()))]
    pub async fn synthesize(&self, script: &str, output_path: &Path) -> Result<SynthesisReport> {
        match tokio::fs::remove_file(output_path).await {
            Ok(()) => debug!("Removed previous output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::File::create(output_path).await?;

        let mut report = SynthesisReport::default();

        for (index, line) in script.split('\n').enumerate() {
            let Some(turn) = self.speakers.parse_line(line) else {
                if !line.trim().is_empty() {
                    report.lines_skipped += 1;
                    debug!("Skipping line {} without speaker label", index + 1);
                }
                continue;
            };

            debug!("Line {}: {} ({})", index + 1, turn.speaker, turn.voice_id);

            let mut stream = self
                .client
                .stream(&turn.text, &turn.voice_id)
                .await
                .map_err(|e| at_line(index + 1, e))?;

            let mut file = tokio::fs::OpenOptions::new()
                .append(true)
                .open(output_path)
                .await?;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| at_line(index + 1, e))?;
                file.write_all(&chunk).await?;
                report.bytes_written += chunk.len() as u64;
            }
            file.flush().await?;

            report.lines_spoken += 1;
        }

        info!(
            "Synthesized {} lines ({} bytes, {} skipped)",
            report.lines_spoken, report.bytes_written, report.lines_skipped
        );
        Ok(report)
    }
}

/// Attach the script line number to a synthesis failure.
fn at_line(line: usize, error: ChatcastError) -> ChatcastError {
    match error {
        ChatcastError::Synthesis(msg) => ChatcastError::Synthesis(format!("line {}: {}", line, msg)),
        other => ChatcastError::Synthesis(format!("line {}: {}", line, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeSpeech;

    const SCRIPT: &str = "**Host:** Welcome!\n**Michael Scott:** Thanks...\n";

    #[tokio::test]
    async fn test_two_lines_two_requests_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("episode.wav");
        let speech = Arc::new(FakeSpeech::new());
        let synthesizer = SpeechSynthesizer::new(speech.clone(), SpeakerTable::default());

        let report = synthesizer.synthesize(SCRIPT, &output).await.unwrap();

        assert_eq!(
            speech.requests(),
            vec![
                ("Welcome!".to_string(), "en-US-natalie".to_string()),
                ("Thanks...".to_string(), "en-US-terrell".to_string()),
            ]
        );
        let audio = std::fs::read(&output).unwrap();
        assert_eq!(audio, b"<en-US-natalie:Welcome!><en-US-terrell:Thanks...>".to_vec());
        assert_eq!(report.lines_spoken, 2);
        assert_eq!(report.bytes_written, audio.len() as u64);
    }

    #[tokio::test]
    async fn test_multi_chunk_streams_appended_in_arrival_order() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("episode.wav");
        let speech = Arc::new(FakeSpeech::new().with_chunk_size(3));
        let synthesizer = SpeechSynthesizer::new(speech, SpeakerTable::default());

        synthesizer.synthesize(SCRIPT, &output).await.unwrap();

        let audio = std::fs::read(&output).unwrap();
        assert_eq!(audio, b"<en-US-natalie:Welcome!><en-US-terrell:Thanks...>".to_vec());
    }

    #[tokio::test]
    async fn test_rerun_replaces_previous_audio() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("episode.wav");
        let speech = Arc::new(FakeSpeech::new());
        let synthesizer = SpeechSynthesizer::new(speech, SpeakerTable::default());

        synthesizer.synthesize(SCRIPT, &output).await.unwrap();
        synthesizer
            .synthesize("**Host:** Second take.", &output)
            .await
            .unwrap();

        let audio = std::fs::read(&output).unwrap();
        assert_eq!(audio, b"<en-US-natalie:Second take.>".to_vec());
    }

    #[tokio::test]
    async fn test_no_recognized_lines_gives_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("episode.wav");
        std::fs::write(&output, b"stale audio").unwrap();
        let speech = Arc::new(FakeSpeech::new());
        let synthesizer = SpeechSynthesizer::new(speech.clone(), SpeakerTable::default());

        let report = synthesizer
            .synthesize("Host: hello\nJust prose.\n**Host:**   \n", &output)
            .await
            .unwrap();

        assert!(speech.requests().is_empty());
        assert_eq!(std::fs::metadata(&output).unwrap().len(), 0);
        assert_eq!(report.lines_spoken, 0);
        assert_eq!(report.lines_skipped, 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_lines() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("episode.wav");
        let speech = Arc::new(FakeSpeech::new().failing_on_request(2));
        let synthesizer = SpeechSynthesizer::new(speech, SpeakerTable::default());

        let err = synthesizer.synthesize(SCRIPT, &output).await.unwrap_err();

        assert!(matches!(err, ChatcastError::Synthesis(_)));
        assert!(err.to_string().contains("line 2"));
        let audio = std::fs::read(&output).unwrap();
        assert_eq!(audio, b"<en-US-natalie:Welcome!>".to_vec());
    }
}
