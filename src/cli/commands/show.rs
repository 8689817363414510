//! Show command implementation.

use super::{chapter_end, load_chapter};
use crate::cli::Output;
use crate::config::Settings;
use crate::content::{format_chapter, OutputFormat};
use anyhow::Result;

/// Run the show command.
pub fn run_show(
    format: &str,
    output: Option<String>,
    chapter: Option<String>,
    settings: &Settings,
) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let chapter = load_chapter(chapter.as_deref(), settings)?;
    let rendered = format_chapter(&chapter, output_format, chapter_end(&chapter, settings));

    match output {
        Some(path) => {
            let path = Settings::expand_path(&path);
            std::fs::write(&path, &rendered)?;
            Output::success(&format!(
                "Exported {} segments to {}",
                chapter.content.len(),
                path.display()
            ));
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_writes_vtt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapter.vtt");

        run_show(
            "vtt",
            Some(path.to_string_lossy().to_string()),
            None,
            &Settings::default(),
        )
        .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("WEBVTT"));
    }

    #[test]
    fn test_show_rejects_unknown_format() {
        assert!(run_show("docx", None, None, &Settings::default()).is_err());
    }
}
