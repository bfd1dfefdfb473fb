//! Parsing of generated scripts into speaker turns.
//!
//! A script line is a turn when it starts with a bold speaker label such as
//! `**Host:**`. Each label maps to a persona and a synthetic voice.

use crate::config::{ScriptSettings, TtsSettings};
use crate::error::{ChatcastError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Conversational role in the podcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Host,
    Expert,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Speaker::Host => write!(f, "host"),
            Speaker::Expert => write!(f, "expert"),
        }
    }
}

/// One recognized turn of the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueLine {
    pub speaker: Speaker,
    pub voice_id: String,
    pub text: String,
}

#[derive(Debug, Clone)]
struct SpeakerEntry {
    prefix: String,
    speaker: Speaker,
    voice_id: String,
}

/// Ordered table of speaker labels.
///
/// Entries are kept longest prefix first so a more specific label always wins
/// over a shorter one that it extends.
#[derive(Debug, Clone)]
pub struct SpeakerTable {
    entries: Vec<SpeakerEntry>,
}

impl SpeakerTable {
    /// Build the table from persona and voice settings.
    ///
    /// The expert is recognized by full name and, when it differs, by short
    /// name. The host and the expert must not share a full name.
    pub fn from_settings(script: &ScriptSettings, tts: &TtsSettings) -> Result<Self> {
        let host = script.host_name.trim();
        let expert = script.expert_name.trim();
        if host.is_empty() || expert.is_empty() {
            return Err(ChatcastError::Config(
                "script.host_name and script.expert_name must not be empty".to_string(),
            ));
        }
        if host == expert {
            return Err(ChatcastError::Config(format!(
                "script.host_name and script.expert_name are both \"{}\"",
                host
            )));
        }
        Ok(Self::build(script, tts))
    }

    fn build(script: &ScriptSettings, tts: &TtsSettings) -> Self {
        let mut table = Self { entries: Vec::new() };
        table.add(&script.expert_name, Speaker::Expert, &tts.expert_voice);
        if let Some(short) = script.expert_short_name() {
            if short.trim() == script.host_name.trim() {
                warn!(
                    "Expert short name \"{}\" is also the host name; **{}:** lines use the host voice",
                    short.trim(),
                    short.trim()
                );
            } else {
                table.add(&short, Speaker::Expert, &tts.expert_voice);
            }
        }
        table.add(&script.host_name, Speaker::Host, &tts.host_voice);
        table
    }

    fn add(&mut self, name: &str, speaker: Speaker, voice_id: &str) {
        let prefix = format!("**{}:**", name.trim());
        if self.entries.iter().any(|e| e.prefix == prefix) {
            return;
        }
        self.entries.push(SpeakerEntry {
            prefix,
            speaker,
            voice_id: voice_id.to_string(),
        });
        // Stable sort keeps insertion order among equal lengths.
        self.entries
            .sort_by(|a, b| b.prefix.chars().count().cmp(&a.prefix.chars().count()));
    }

    /// Labels in match order.
    pub fn prefixes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.prefix.as_str()).collect()
    }

    /// Parse one script line.
    ///
    /// Returns `None` for lines without a known label and for labels followed
    /// by nothing but whitespace.
    pub fn parse_line(&self, line: &str) -> Option<DialogueLine> {
        let entry = self.entries.iter().find(|e| line.starts_with(&e.prefix))?;
        let text = line[entry.prefix.len()..].trim();
        if text.is_empty() {
            return None;
        }

        Some(DialogueLine {
            speaker: entry.speaker,
            voice_id: entry.voice_id.clone(),
            text: text.to_string(),
        })
    }
}

impl Default for SpeakerTable {
    fn default() -> Self {
        Self::build(&ScriptSettings::default(), &TtsSettings::default())
    }
}
