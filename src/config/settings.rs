//! Configuration settings for ChatCast.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub summarize: SummarizeSettings,
    pub script: ScriptSettings,
    pub tts: TtsSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Working directory for uploaded documents and generated audio.
    pub work_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Directory containing the pdfium shared library. Falls back to the system library.
    pub pdfium_library_dir: Option<String>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            work_dir: "/tmp/chatcast".to_string(),
            log_level: "info".to_string(),
            pdfium_library_dir: None,
        }
    }
}

/// Language model settings, shared by the summarize and script stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible chat completions API.
    pub api_base: String,
    /// Model name.
    pub model: String,
    /// API key. Takes precedence over `api_key_env` when set.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional per-request timeout. Unset means calls may block indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-1.5-flash-8b".to_string(),
            api_key: None,
            api_key_env: "GOOGLE_API_KEY".to_string(),
            temperature: 0.7,
            request_timeout_secs: None,
        }
    }
}

/// Text splitting settings for the summarize stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizeSettings {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for SummarizeSettings {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
        }
    }
}

/// Persona settings for the script stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// Name of the podcast mentioned in the script prompt.
    pub podcast_name: String,
    /// Speaker label of the host persona.
    pub host_name: String,
    /// Full name of the expert persona.
    pub expert_name: String,
    /// Short form of the expert name. Defaults to the first word of `expert_name`.
    pub expert_short_name: Option<String>,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            podcast_name: "ChatCast".to_string(),
            host_name: "Host".to_string(),
            expert_name: "Michael Scott".to_string(),
            expert_short_name: None,
        }
    }
}

impl ScriptSettings {
    /// Short form of the expert name, if it differs from the full name.
    pub fn expert_short_name(&self) -> Option<String> {
        let short = match &self.expert_short_name {
            Some(name) => name.trim().to_string(),
            None => self
                .expert_name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
        };

        if short.is_empty() || short == self.expert_name.trim() {
            None
        } else {
            Some(short)
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    /// Base URL of the Murf API.
    pub api_base: String,
    /// API key. Takes precedence over `api_key_env` when set.
    pub api_key: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Voice used for the host persona.
    pub host_voice: String,
    /// Voice used for the expert persona.
    pub expert_voice: String,
    /// Audio container requested from the provider.
    pub format: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.murf.ai/v1".to_string(),
            api_key: None,
            api_key_env: "MURF_API_KEY".to_string(),
            host_voice: "en-US-natalie".to_string(),
            expert_voice: "en-US-terrell".to_string(),
            format: "WAV".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
    /// Accepted document extensions (lowercase, without the dot).
    pub allowed_extensions: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_upload_bytes: 16 * 1024 * 1024,
            allowed_extensions: vec!["pdf".to_string()],
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// API keys for the two external providers.
///
/// Resolved once from settings and the environment. A missing key is not an
/// error until a job actually needs it.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub llm_api_key: Option<String>,
    pub tts_api_key: Option<String>,
    llm_key_name: String,
    tts_key_name: String,
}

impl Credentials {
    /// Build credentials from explicit values.
    pub fn new(llm_api_key: Option<String>, tts_api_key: Option<String>) -> Self {
        let defaults = Settings::default();
        Self {
            llm_api_key: llm_api_key.filter(|k| !k.is_empty()),
            tts_api_key: tts_api_key.filter(|k| !k.is_empty()),
            llm_key_name: defaults.llm.api_key_env,
            tts_key_name: defaults.tts.api_key_env,
        }
    }

    /// Resolve credentials from settings, falling back to environment variables.
    pub fn from_settings(settings: &Settings) -> Self {
        let resolve = |explicit: &Option<String>, env: &str| {
            explicit
                .clone()
                .filter(|k| !k.trim().is_empty())
                .or_else(|| std::env::var(env).ok())
                .filter(|k| !k.trim().is_empty())
        };

        Self {
            llm_api_key: resolve(&settings.llm.api_key, &settings.llm.api_key_env),
            tts_api_key: resolve(&settings.tts.api_key, &settings.tts.api_key_env),
            llm_key_name: settings.llm.api_key_env.clone(),
            tts_key_name: settings.tts.api_key_env.clone(),
        }
    }

    /// Return both keys, or the name of the first missing one.
    pub fn require(&self) -> crate::error::Result<(&str, &str)> {
        let llm = self
            .llm_api_key
            .as_deref()
            .ok_or_else(|| crate::error::ChatcastError::MissingCredential(self.llm_key_name.clone()))?;
        let tts = self
            .tts_api_key
            .as_deref()
            .ok_or_else(|| crate::error::ChatcastError::MissingCredential(self.tts_key_name.clone()))?;
        Ok((llm, tts))
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatcast")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded working directory path.
    pub fn work_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.work_dir)
    }

    /// Get the expanded pdfium library directory, if configured.
    pub fn pdfium_library_dir(&self) -> Option<PathBuf> {
        self.general
            .pdfium_library_dir
            .as_deref()
            .map(Self::expand_path)
    }
}
