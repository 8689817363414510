//! CLI module for readalong.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::config::OutputKind;
use clap::{Parser, Subcommand};

/// readalong - Read along with an audio chapter
///
/// Follows the narration line by line in the terminal and answers questions
/// about the text with a hosted language model.
#[derive(Parser, Debug)]
#[command(name = "readalong")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive reading session
    Read {
        /// Audio URL or local file (overrides playback.audio_source)
        #[arg(short, long)]
        audio: Option<String>,

        /// Chapter file in JSON or TOML (overrides content.chapter_path)
        #[arg(long)]
        chapter: Option<String>,

        /// Start without an audio source and pick a file later
        #[arg(long, conflicts_with = "audio")]
        no_audio: bool,

        /// Audio output: clock or rodio (overrides playback.output)
        #[arg(long)]
        output: Option<OutputKind>,
    },

    /// Ask the reading assistant a single question about the chapter
    Ask {
        /// The question to ask
        question: String,

        /// Chapter file in JSON or TOML
        #[arg(long)]
        chapter: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Print or export the chapter text
    Show {
        /// Output format (text, json, srt, vtt)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Chapter file in JSON or TOML
        #[arg(long)]
        chapter: Option<String>,
    },

    /// Show which line is being read at a given time
    At {
        /// Playback position (seconds or m:ss)
        time: String,

        /// Chapter file in JSON or TOML
        #[arg(long)]
        chapter: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_output_override() {
        let cli = Cli::try_parse_from(["readalong", "read", "--output", "rodio"]).unwrap();
        match cli.command {
            Commands::Read { output, .. } => assert_eq!(output, Some(OutputKind::Rodio)),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["readalong", "read"]).unwrap();
        assert!(matches!(cli.command, Commands::Read { output: None, .. }));

        assert!(Cli::try_parse_from(["readalong", "read", "--output", "speaker"]).is_err());
    }
}
