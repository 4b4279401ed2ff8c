use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Strategy timeout bounds in seconds. One caption fetch is a single external
/// process; anything outside this window is either too eager or hung.
const MIN_STRATEGY_TIMEOUT_SECS: u64 = 30;
const MAX_STRATEGY_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP service settings
    pub server: ServerConfig,

    /// Caption extraction settings
    pub extraction: ExtractionConfig,

    /// Completion service settings
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Log the shape of incoming analyze requests at debug level
    pub debug_requests: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Path to the yt-dlp binary
    pub yt_dlp_path: String,

    /// Per-strategy timeout in seconds
    pub strategy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// API key; falls back to the OPENAI_API_KEY environment variable.
    /// Absence is not an error - briefs degrade to the deterministic template.
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Service base URL
    pub endpoint: String,

    /// Output token cap per request
    pub max_tokens: u32,

    /// Sampling temperature; kept low for near-deterministic briefs
    pub temperature: f32,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                debug_requests: false,
            },
            extraction: ExtractionConfig {
                yt_dlp_path: "yt-dlp".to_string(),
                strategy_timeout_secs: 40,
            },
            completion: CompletionConfig::default(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            endpoint: "https://api.openai.com/v1".to_string(),
            max_tokens: 900,
            temperature: 0.2,
            timeout_secs: 45,
        }
    }
}

impl CompletionConfig {
    /// Resolve the credential from config or environment. Returns `None` when
    /// neither source has a non-empty value.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("OPENAI_API_KEY")
                    .ok()
                    .map(|key| key.trim().to_string())
                    .filter(|key| !key.is_empty())
            })
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content =
                fs_err::read_to_string(&config_path).context("Failed to read config file")?;

            let config: Config =
                serde_yaml::from_str(&content).context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("vidbrief").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let timeout = self.extraction.strategy_timeout_secs;
        if !(MIN_STRATEGY_TIMEOUT_SECS..=MAX_STRATEGY_TIMEOUT_SECS).contains(&timeout) {
            anyhow::bail!(
                "extraction.strategy_timeout_secs must be between {} and {}, got {}",
                MIN_STRATEGY_TIMEOUT_SECS,
                MAX_STRATEGY_TIMEOUT_SECS,
                timeout
            );
        }

        if self.extraction.yt_dlp_path.trim().is_empty() {
            anyhow::bail!("extraction.yt_dlp_path must not be empty");
        }

        if self.completion.max_tokens == 0 {
            anyhow::bail!("completion.max_tokens must be positive");
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            anyhow::bail!("completion.temperature must be between 0.0 and 2.0");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Server: {}:{}", self.server.host, self.server.port);
        println!("  Debug requests: {}", self.server.debug_requests);
        println!("  Caption tool: {}", self.extraction.yt_dlp_path);
        println!(
            "  Strategy timeout: {}s",
            self.extraction.strategy_timeout_secs
        );
        println!("  Completion model: {}", self.completion.model);
        println!("  Completion endpoint: {}", self.completion.endpoint);
        println!(
            "  Credential configured: {}",
            self.completion.resolved_api_key().is_some()
        );
    }
}
