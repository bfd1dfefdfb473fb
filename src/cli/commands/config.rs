//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            let config_path = Settings::default_config_path();
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Hide API keys written into the config file.
fn redacted(mut settings: Settings) -> Settings {
    if settings.llm.api_key.is_some() {
        settings.llm.api_key = Some("<redacted>".to_string());
    }
    if settings.tts.api_key.is_some() {
        settings.tts.api_key = Some("<redacted>".to_string());
    }
    settings
}
