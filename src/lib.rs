//! Vidbrief - a service and CLI for extracting YouTube transcripts and generating
//! validated intelligence briefs
//!
//! This library provides two composable pipelines: caption-based transcript
//! acquisition (backed by yt-dlp) and brief generation against an
//! OpenAI-compatible completion service, with deterministic fallbacks.

pub mod brief;
pub mod captions;
pub mod cli;
pub mod config;
pub mod locator;
pub mod server;
pub mod utils;

pub use brief::{AnalysisMethod, BriefOutput, BriefPipeline, BriefRequest};
pub use captions::{AcquisitionPipeline, Transcript, TranscriptOutcome};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use locator::VideoLocator;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Minimum cleaned-text length (in characters) considered usable, both for the
/// description metadata fallback and for callers deciding whether a transcript
/// is worth analyzing. Single source of truth for both checks.
pub const MIN_USABLE_TEXT_LEN: usize = 50;

/// Fixed sentence fed to the brief pipeline when no usable transcript exists.
pub const NO_CAPTIONS_PLACEHOLDER: &str =
    "No captions available. Provide a conceptual intelligence brief based on title and general context.";

/// Error types specific to vidbrief
#[derive(thiserror::Error, Debug)]
pub enum VidbriefError {
    #[error("Invalid video locator: {0}")]
    InvalidLocator(String),

    #[error("Transcript is missing or empty")]
    MissingTranscript,

    #[error("Caption extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Brief generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generated brief violates the output contract: {0}")]
    ContractViolation(String),
}
