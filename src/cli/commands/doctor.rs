//! Doctor command - verify the environment and configuration.

use super::load_chapter;
use crate::cli::Output;
use crate::config::{OutputKind, Settings};
use crate::content::format_timestamp;
use crate::playback::{is_audio_file, AudioSourceRef};
use console::style;
use std::path::Path;

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
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("readalong doctor");
    println!();
    println!("Checking configuration and environment...\n");

    let mut checks = Vec::new();

    let mut section = |title: &str, results: Vec<CheckResult>| {
        println!("{}", style(title).bold());
        for check in &results {
            check.print();
        }
        println!();
        checks.extend(results);
    };

    section("Assistant", vec![check_openai_api_key(settings)]);
    section("Chapter", vec![check_chapter(settings)]);
    section(
        "Audio",
        vec![
            check_audio_source(settings.playback.audio_source.as_deref()),
            check_output(settings.playback.output),
        ],
    );
    section("Configuration", vec![check_config_file(config_path)]);

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before reading.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! readalong is ready to use.");
    }

    Ok(())
}

/// Check if the OpenAI API key is configured.
///
/// Missing keys are only a warning: reading works, questions get the fallback reply.
fn check_openai_api_key(settings: &Settings) -> CheckResult {
    if let Some(base) = settings.assistant.api_base.as_deref().filter(|b| !b.is_empty()) {
        return CheckResult::ok("Endpoint", &format!("{} ({})", base, settings.assistant.model));
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(key) if key.is_empty() => CheckResult::warning(
            "OPENAI_API_KEY",
            "empty",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "not set (the reading guide will be unavailable)",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check that the chapter loads and validates.
fn check_chapter(settings: &Settings) -> CheckResult {
    let source = settings
        .chapter_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());

    match load_chapter(None, settings) {
        Ok(chapter) => CheckResult::ok(
            "Chapter",
            &format!(
                "{} ({} segments, last at {}, {})",
                chapter.title,
                chapter.content.len(),
                chapter
                    .content
                    .last()
                    .map(|s| format_timestamp(s.start_time))
                    .unwrap_or_else(|| "0:00".to_string()),
                source
            ),
        ),
        Err(e) => CheckResult::error(
            "Chapter",
            &format!("{}: {}", source, e),
            "Fix the file or remove content.chapter_path to use the built-in chapter",
        ),
    }
}

/// Check the configured audio source.
fn check_audio_source(source: Option<&str>) -> CheckResult {
    let Some(input) = source.filter(|s| !s.trim().is_empty()) else {
        return CheckResult::warning(
            "Audio source",
            "none configured",
            "Use 'open <path>' in a session or set playback.audio_source",
        );
    };

    match AudioSourceRef::parse(input) {
        AudioSourceRef::Url(url) => CheckResult::ok("Audio source", &format!("{} (remote)", url)),
        AudioSourceRef::LocalFile(path) if !path.exists() => CheckResult::warning(
            "Audio source",
            &format!("{} (not found)", path.display()),
            "Use 'open <path>' in a session or update playback.audio_source",
        ),
        AudioSourceRef::LocalFile(path) if !is_audio_file(&path) => CheckResult::warning(
            "Audio source",
            &format!("{} (not a recognized audio file)", path.display()),
            "Supported: mp3, m4a, wav, ogg, flac and similar",
        ),
        AudioSourceRef::LocalFile(path) => {
            let size = std::fs::metadata(&path)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "unknown size".to_string());
            CheckResult::ok("Audio source", &format!("{} ({})", path.display(), size))
        }
    }
}

/// Check that the configured output is available in this build.
fn check_output(kind: OutputKind) -> CheckResult {
    match kind {
        OutputKind::Clock => {
            CheckResult::ok("Output", &format!("{} (silent, follows the wall clock)", kind))
        }
        OutputKind::Rodio if cfg!(feature = "rodio") => CheckResult::ok("Output", &kind.to_string()),
        OutputKind::Rodio => CheckResult::error(
            "Output",
            &format!("{} requested but not compiled in", kind),
            "Rebuild with: cargo install readalong --features rodio",
        ),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: readalong config edit",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
