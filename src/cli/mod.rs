use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "summarizer",
    about = "Video Summarizer - Summaries, sentiment and keywords for YouTube videos and local video files",
    version,
    long_about = "A CLI tool that turns a YouTube video or a local video file into a summary. Captions are used when available; otherwise the audio is transcribed with AWS Transcribe. Summaries come from an OpenAI-compatible chat completions API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a YouTube video or a local video file
    Summarize {
        /// YouTube URL or path to a local video file (mp4, avi, mov, mkv)
        #[arg(value_name = "URL_OR_FILE")]
        input: String,

        /// Summary layout (bullet_points, narrative, markdown)
        #[arg(long, default_value = "bullet_points")]
        format: String,

        /// Summary length (short, medium, long)
        #[arg(long, default_value = "medium")]
        length: String,

        /// Language the summary is written in
        #[arg(long, default_value = "english")]
        language: String,

        /// Include sentiment analysis of the transcript
        #[arg(long)]
        sentiment: bool,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum)]
        output_format: Option<OutputFormat>,
    },

    /// List stored summaries
    List,

    /// Show a stored summary
    Show {
        #[arg(value_name = "ID")]
        id: String,

        /// Output format
        #[arg(long, value_enum)]
        output_format: Option<OutputFormat>,
    },

    /// Delete a stored summary
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Export a stored summary to a file
    Export {
        #[arg(value_name = "ID")]
        id: String,

        /// Output file path (defaults to the sanitized title)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported inputs and summary options
    Formats,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text export
    Text,
    /// Full record as JSON
    Json,
    /// Markdown document
    Markdown,
}

impl OutputFormat {
    /// Parse a configured default, falling back to text
    pub fn from_config(value: &str) -> Self {
        <Self as ValueEnum>::from_str(value, true).unwrap_or(OutputFormat::Text)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
