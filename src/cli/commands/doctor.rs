//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::extract::PdfiumExtractor;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("ChatCast Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("PDF Extraction").bold());
    let pdfium_check = check_pdfium(settings);
    pdfium_check.print();
    checks.push(pdfium_check);

    println!();

    println!("{}", style("API Keys").bold());
    let credentials = Credentials::from_settings(settings);
    let key_checks = vec![
        check_api_key(
            &settings.llm.api_key_env,
            credentials.llm_api_key.as_deref(),
        ),
        check_api_key(
            &settings.tts.api_key_env,
            credentials.tts_api_key.as_deref(),
        ),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_work_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using ChatCast.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! ChatCast is ready to use.");
    }

    Ok(())
}

fn check_pdfium(settings: &Settings) -> CheckResult {
    let extractor = PdfiumExtractor::with_library_dir(settings.pdfium_library_dir());
    match extractor.check_library() {
        Ok(()) => CheckResult::ok("pdfium", "library found"),
        Err(e) => CheckResult::error("pdfium", &e.to_string(), install_hint_pdfium()),
    }
}

/// Check that an API key is configured, showing it masked.
fn check_api_key(name: &str, key: Option<&str>) -> CheckResult {
    match key {
        Some(key) => CheckResult::ok(name, &format!("configured ({})", mask_key(key))),
        None => CheckResult::error(
            name,
            "not set",
            &format!("Set with: export {}='...'", name),
        ),
    }
}

fn check_work_dir(settings: &Settings) -> CheckResult {
    let work_dir = settings.work_dir();
    if work_dir.is_dir() {
        CheckResult::ok("Work directory", &format!("{}", work_dir.display()))
    } else {
        CheckResult::warning(
            "Work directory",
            &format!("{} (will be created)", work_dir.display()),
            "Directory will be created on first use",
        )
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override defaults", config_path.display()),
        )
    }
}

/// Keep the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn install_hint_pdfium() -> &'static str {
    if cfg!(target_os = "macos") {
        "Download libpdfium.dylib from https://github.com/bblanchon/pdfium-binaries and set general.pdfium_library_dir"
    } else if cfg!(target_os = "linux") {
        "Download libpdfium.so from https://github.com/bblanchon/pdfium-binaries and set general.pdfium_library_dir"
    } else {
        "Download pdfium from https://github.com/bblanchon/pdfium-binaries and set general.pdfium_library_dir"
    }
}
