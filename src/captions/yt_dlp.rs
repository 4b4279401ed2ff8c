use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use super::{artifact_prefix, CaptionFormat, CaptionSource, ExtractionStrategy, LangPref};
use crate::config::ExtractionConfig;
use crate::Result;

/// A caption file produced by one extraction attempt, tagged with its detected
/// markup format.
#[derive(Debug, Clone)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub format: CaptionFormat,
}

/// Descriptive video metadata reported by the caption tool.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Seam between the acquisition pipeline and the external caption tool.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionTool: Send + Sync {
    /// Best-effort listing of available caption tracks, used only to enrich
    /// failure diagnostics.
    async fn list_tracks(&self, watch_url: &str) -> Result<String>;

    /// Run one extraction strategy. Returns the artifact file if the tool
    /// produced a non-empty one, `None` if the strategy simply found nothing.
    async fn fetch_captions(
        &self,
        watch_url: &str,
        video_id: &str,
        strategy: &ExtractionStrategy,
        dest_dir: &Path,
    ) -> Result<Option<FetchedArtifact>>;

    /// Fetch title and description metadata for the fallback transcript.
    async fn fetch_metadata(&self, watch_url: &str) -> Result<VideoMetadata>;
}

/// Caption tool backed by the yt-dlp binary.
pub struct YtDlpTool {
    path: String,
    timeout: Duration,
}

impl YtDlpTool {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            path: config.yt_dlp_path.clone(),
            timeout: Duration::from_secs(config.strategy_timeout_secs),
        }
    }

    /// Run yt-dlp with the given arguments, bounded by the configured timeout.
    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        tracing::debug!(tool = %self.path, ?args, "invoking caption tool");

        let future = Command::new(&self.path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, future).await {
            Ok(output) => Ok(output?),
            Err(_) => anyhow::bail!(
                "caption tool timed out after {}s",
                self.timeout.as_secs()
            ),
        }
    }

    /// Locate the subtitle file the tool wrote for this video id, if any.
    ///
    /// yt-dlp expands the output template to `sub_{videoId}.{lang}.{ext}`, with
    /// the language tag unknown in advance for the any-language strategies, so
    /// the destination directory is scanned by prefix instead.
    fn find_artifact(video_id: &str, dest_dir: &Path) -> Result<Option<FetchedArtifact>> {
        let prefix = format!("{}.", artifact_prefix(video_id));

        for entry in fs_err::read_dir(dest_dir)? {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(&prefix) {
                continue;
            }
            let Some(format) = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(CaptionFormat::from_extension)
            else {
                continue;
            };
            if fs_err::metadata(&path)?.len() == 0 {
                continue;
            }
            return Ok(Some(FetchedArtifact { path, format }));
        }

        Ok(None)
    }
}

#[async_trait]
impl CaptionTool for YtDlpTool {
    async fn list_tracks(&self, watch_url: &str) -> Result<String> {
        let output = self
            .run(&["--list-subs", "--skip-download", "--no-playlist", "--no-warnings", watch_url])
            .await?;

        if !output.status.success() {
            anyhow::bail!(
                "caption track listing failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn fetch_captions(
        &self,
        watch_url: &str,
        video_id: &str,
        strategy: &ExtractionStrategy,
        dest_dir: &Path,
    ) -> Result<Option<FetchedArtifact>> {
        let source_flag = match strategy.source {
            CaptionSource::Auto => "--write-auto-subs",
            CaptionSource::Manual => "--write-subs",
        };
        let langs = match strategy.lang {
            LangPref::English => "en,en-US,en-GB",
            LangPref::Any => "all",
        };
        let template = dest_dir
            .join(format!("{}.%(ext)s", artifact_prefix(video_id)))
            .to_string_lossy()
            .into_owned();

        let output = self
            .run(&[
                "--skip-download",
                "--no-playlist",
                "--no-warnings",
                source_flag,
                "--sub-langs",
                langs,
                "--sub-format",
                strategy.format.as_str(),
                "--output",
                template.as_str(),
                watch_url,
            ])
            .await?;

        if !output.status.success() {
            anyhow::bail!(
                "caption fetch failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Self::find_artifact(video_id, dest_dir)
    }

    async fn fetch_metadata(&self, watch_url: &str) -> Result<VideoMetadata> {
        let output = self
            .run(&["--dump-json", "--skip-download", "--no-playlist", "--no-warnings", watch_url])
            .await?;

        if !output.status.success() {
            anyhow::bail!(
                "metadata fetch failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let metadata: VideoMetadata = serde_json::from_slice(&output.stdout)?;
        Ok(metadata)
    }
}
