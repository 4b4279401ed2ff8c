use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tempfile::TempDir;

pub mod parser;
pub mod yt_dlp;

pub use yt_dlp::{CaptionTool, FetchedArtifact, VideoMetadata, YtDlpTool};

use crate::config::ExtractionConfig;
use crate::locator::VideoLocator;
use crate::utils::sanitize_filename;
use crate::{Result, MIN_USABLE_TEXT_LEN};

/// Where a caption track comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    Auto,
    Manual,
}

impl CaptionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionSource::Auto => "auto",
            CaptionSource::Manual => "manual",
        }
    }
}

/// Language preference for a caption fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LangPref {
    English,
    Any,
}

impl LangPref {
    pub fn as_str(&self) -> &'static str {
        match self {
            LangPref::English => "en",
            LangPref::Any => "any",
        }
    }
}

/// Supported caption markup formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionFormat {
    Vtt,
    Srt,
    Json3,
}

impl CaptionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptionFormat::Vtt => "vtt",
            CaptionFormat::Srt => "srt",
            CaptionFormat::Json3 => "json3",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "vtt" => Some(CaptionFormat::Vtt),
            "srt" => Some(CaptionFormat::Srt),
            "json3" => Some(CaptionFormat::Json3),
            _ => None,
        }
    }
}

/// One configured caption extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionStrategy {
    pub source: CaptionSource,
    pub lang: LangPref,
    pub format: CaptionFormat,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.source.as_str(),
            self.lang.as_str(),
            self.format.as_str()
        )
    }
}

/// Fixed strategy order, tried until the first one produces a caption file.
///
/// Auto-generated English tracks exist for most videos and parse cleanly, so
/// they lead; manual tracks follow, then a last attempt in the alternate
/// subtitle format.
pub const STRATEGIES: [ExtractionStrategy; 5] = [
    ExtractionStrategy {
        source: CaptionSource::Auto,
        lang: LangPref::English,
        format: CaptionFormat::Vtt,
    },
    ExtractionStrategy {
        source: CaptionSource::Auto,
        lang: LangPref::Any,
        format: CaptionFormat::Vtt,
    },
    ExtractionStrategy {
        source: CaptionSource::Manual,
        lang: LangPref::English,
        format: CaptionFormat::Vtt,
    },
    ExtractionStrategy {
        source: CaptionSource::Manual,
        lang: LangPref::Any,
        format: CaptionFormat::Vtt,
    },
    ExtractionStrategy {
        source: CaptionSource::Auto,
        lang: LangPref::Any,
        format: CaptionFormat::Srt,
    },
];

/// Provenance of an acquired transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    Captions,
    DescriptionFallback,
}

/// Plain-text transcript with provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub text: String,
    pub source: TranscriptSource,
}

impl Transcript {
    /// Cleaned length in characters, reported so callers can apply the
    /// usability threshold themselves.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Structured failure payload surfaced when every extraction path is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionDiagnostics {
    pub error: String,
    pub detail: String,
    pub hint: String,
    pub troubleshooting: Vec<String>,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

/// Result of a transcript acquisition run. Never an error: failures carry
/// diagnostics for the caller to surface.
#[derive(Debug, Clone)]
pub enum TranscriptOutcome {
    Available(Transcript),
    Unavailable(ExtractionDiagnostics),
}

/// Filename prefix for transient caption artifacts, namespaced per video id so
/// concurrent requests for different videos cannot collide.
pub(crate) fn artifact_prefix(video_id: &str) -> String {
    format!("sub_{}", sanitize_filename(video_id))
}

/// Transcript acquisition pipeline
pub struct AcquisitionPipeline {
    tool: Arc<dyn CaptionTool>,
    temp_dir: TempDir,
}

impl AcquisitionPipeline {
    /// Create a pipeline backed by the yt-dlp binary from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Self::with_tool(Arc::new(YtDlpTool::new(config)))
    }

    /// Create a pipeline over an arbitrary caption tool implementation.
    pub fn with_tool(tool: Arc<dyn CaptionTool>) -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temporary directory")?;
        Ok(Self { tool, temp_dir })
    }

    /// Acquire a transcript for the given locator.
    ///
    /// Tries the fixed strategy list in order, stops at the first strategy
    /// that produces a caption file, and falls back to description metadata
    /// when no captions exist. Transient artifacts are purged on every exit
    /// path.
    pub async fn acquire(&self, locator: &VideoLocator) -> TranscriptOutcome {
        let track_listing = match self.tool.list_tracks(&locator.canonical_url).await {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::debug!(video_id = %locator.video_id, error = %e, "caption track probe failed");
                None
            }
        };

        let result = self.try_extraction(locator).await;
        self.purge_artifacts(&locator.video_id);

        match result {
            Ok(transcript) => {
                tracing::info!(
                    video_id = %locator.video_id,
                    source = ?transcript.source,
                    length = transcript.char_len(),
                    "transcript acquired"
                );
                TranscriptOutcome::Available(transcript)
            }
            Err(detail) => {
                tracing::warn!(video_id = %locator.video_id, "all extraction paths exhausted");
                TranscriptOutcome::Unavailable(build_diagnostics(locator, detail, track_listing))
            }
        }
    }

    /// Inner extraction flow; the error is the accumulated failure detail.
    async fn try_extraction(&self, locator: &VideoLocator) -> std::result::Result<Transcript, String> {
        let mut failures: Vec<String> = Vec::new();
        let mut artifact: Option<(ExtractionStrategy, FetchedArtifact)> = None;

        for strategy in &STRATEGIES {
            match self
                .tool
                .fetch_captions(
                    &locator.canonical_url,
                    &locator.video_id,
                    strategy,
                    self.temp_dir.path(),
                )
                .await
            {
                Ok(Some(found)) => {
                    tracing::debug!(%strategy, path = %found.path.display(), "caption file produced");
                    artifact = Some((*strategy, found));
                    break;
                }
                Ok(None) => failures.push(format!("{strategy}: no caption file produced")),
                Err(e) => failures.push(format!("{strategy}: {e:#}")),
            }
        }

        if let Some((strategy, artifact)) = artifact {
            match self.parse_artifact(&artifact) {
                Ok(text) if !text.trim().is_empty() => {
                    return Ok(Transcript {
                        text,
                        source: TranscriptSource::Captions,
                    });
                }
                Ok(_) => failures.push(format!("{strategy}: artifact cleaned to empty text")),
                Err(e) => failures.push(format!("{strategy}: {e:#}")),
            }
        }

        match self.tool.fetch_metadata(&locator.canonical_url).await {
            Ok(metadata) => {
                let description = metadata.description.unwrap_or_default();
                let description = description.trim();
                if description.chars().count() > MIN_USABLE_TEXT_LEN {
                    let title = metadata.title.unwrap_or_else(|| "Untitled video".to_string());
                    return Ok(Transcript {
                        text: format!("{title}. {description}"),
                        source: TranscriptSource::DescriptionFallback,
                    });
                }
                failures.push(format!(
                    "metadata: description too short for fallback ({} chars)",
                    description.chars().count()
                ));
            }
            Err(e) => failures.push(format!("metadata: {e:#}")),
        }

        Err(failures.join("; "))
    }

    fn parse_artifact(&self, artifact: &FetchedArtifact) -> Result<String> {
        let raw = fs_err::read_to_string(&artifact.path)?;
        parser::extract_text(artifact.format, &raw)
    }

    /// Delete every transient artifact written for this video id.
    fn purge_artifacts(&self, video_id: &str) {
        let prefix = format!("{}.", artifact_prefix(video_id));
        let Ok(entries) = std::fs::read_dir(self.temp_dir.path()) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(&prefix))
                .unwrap_or(false);
            if matches {
                if let Err(e) = fs_err::remove_file(&path) {
                    tracing::debug!(path = %path.display(), error = %e, "artifact cleanup failed");
                }
            }
        }
    }
}

fn build_diagnostics(
    locator: &VideoLocator,
    detail: String,
    track_listing: Option<String>,
) -> ExtractionDiagnostics {
    let detail = match track_listing {
        Some(listing) if !listing.trim().is_empty() => {
            format!("{detail}\nAvailable tracks:\n{}", listing.trim())
        }
        _ => detail,
    };

    ExtractionDiagnostics {
        error: "No transcript available".to_string(),
        detail,
        hint: "This video may not have captions/subtitles enabled.".to_string(),
        troubleshooting: vec![
            "Check for the CC button on the YouTube player".to_string(),
            "Try a different video that has captions".to_string(),
            "Update yt-dlp to the latest version".to_string(),
            "Inspect the server log for the full tool output".to_string(),
        ],
        video_id: locator.video_id.clone(),
    }
}
