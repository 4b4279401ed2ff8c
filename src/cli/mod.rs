use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vidbrief",
    about = "Vidbrief - Extract YouTube transcripts and generate validated intelligence briefs",
    version,
    long_about = "A service and CLI that extracts caption transcripts from YouTube videos via yt-dlp and turns them into fixed-format intelligence briefs through an OpenAI-compatible completion service, degrading to deterministic fallbacks when captions or the service are unavailable."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service consumed by the browser extension
    Serve {
        /// Bind address (overrides configuration)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Listen port (overrides configuration)
        #[arg(short, long, value_name = "PORT", env = "VIDBRIEF_PORT")]
        port: Option<u16>,
    },

    /// Extract a transcript from a video URL
    Transcript {
        /// Video URL (any watch URL carrying a v= parameter)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Extract a transcript and generate an intelligence brief
    Brief {
        /// Video URL (any watch URL carrying a v= parameter)
        #[arg(value_name = "URL")]
        url: String,

        /// Video title forwarded to the generation prompt
        #[arg(short, long, value_name = "TITLE")]
        title: Option<String>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialize configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with provenance metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
