use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod openai;
pub mod prompts;
pub mod validate;

pub use openai::{CompletionClient, OpenAiClient};
pub use validate::{looks_like_transcript, validate_brief_format};

use crate::config::CompletionConfig;
use crate::utils::truncate_chars;
use crate::{Result, VidbriefError};

/// Upper bound on transcript characters forwarded to the completion service.
pub const TRANSCRIPT_PREVIEW_LIMIT: usize = 15_000;

/// Input to one brief generation run.
#[derive(Debug, Clone)]
pub struct BriefRequest {
    pub transcript: String,
    pub video_url: String,
    pub video_title: String,
}

/// How the returned brief text was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    /// Validated output of the completion service.
    Primary,
    /// Service responded but the output violated the contract.
    FallbackFormat,
    /// Service errored or timed out.
    Fallback,
    /// No credential configured; service never invoked.
    Basic,
}

/// A contract-valid brief with provenance.
#[derive(Debug, Clone, Serialize)]
pub struct BriefOutput {
    pub text: String,
    pub method: AnalysisMethod,
    pub generated_at: DateTime<Utc>,
}

/// Brief generation pipeline
///
/// The only error that escapes is [`VidbriefError::MissingTranscript`];
/// every downstream failure degrades to the deterministic template, so the
/// returned text always satisfies the format contract.
pub struct BriefPipeline {
    client: Option<Box<dyn CompletionClient>>,
}

impl BriefPipeline {
    /// Build a pipeline from configuration. A missing completion credential
    /// is not an error: the pipeline runs in template-only mode.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let client = OpenAiClient::from_config(config)?
            .map(|client| Box::new(client) as Box<dyn CompletionClient>);
        if client.is_none() {
            tracing::warn!(
                "no completion credential configured; briefs will use the deterministic template"
            );
        }
        Ok(Self { client })
    }

    pub fn with_client(client: Box<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn without_client() -> Self {
        Self { client: None }
    }

    /// Generate a brief for the request.
    pub async fn generate(
        &self,
        request: &BriefRequest,
    ) -> std::result::Result<BriefOutput, VidbriefError> {
        if request.transcript.trim().is_empty() {
            return Err(VidbriefError::MissingTranscript);
        }

        let Some(client) = &self.client else {
            return Ok(finish(fallback_brief(), AnalysisMethod::Basic));
        };

        let preview = truncate_chars(&request.transcript, TRANSCRIPT_PREVIEW_LIMIT);
        if preview.len() < request.transcript.len() {
            tracing::info!(
                limit = TRANSCRIPT_PREVIEW_LIMIT,
                original_chars = request.transcript.chars().count(),
                "transcript truncated before generation"
            );
        }

        let user_prompt =
            prompts::build_user_prompt(preview, &request.video_title, &request.video_url);

        let candidate: std::result::Result<String, VidbriefError> = match client
            .complete(prompts::SYSTEM_INSTRUCTION, &user_prompt)
            .await
        {
            Ok(text) if validate_brief_format(&text) => Ok(text.trim().to_string()),
            Ok(_) => Err(VidbriefError::ContractViolation(
                "missing required headings or transcript-like content".to_string(),
            )),
            Err(e) => Err(VidbriefError::GenerationFailed(format!("{e:#}"))),
        };

        match candidate {
            Ok(text) => Ok(finish(text, AnalysisMethod::Primary)),
            Err(e @ VidbriefError::ContractViolation(_)) => {
                tracing::warn!(error = %e, "substituting fallback template");
                Ok(finish(fallback_brief(), AnalysisMethod::FallbackFormat))
            }
            Err(e) => {
                tracing::warn!(error = %e, "substituting fallback template");
                Ok(finish(fallback_brief(), AnalysisMethod::Fallback))
            }
        }
    }
}

fn finish(text: String, method: AnalysisMethod) -> BriefOutput {
    BriefOutput {
        text,
        method,
        generated_at: Utc::now(),
    }
}

/// Fixed deterministic fallback brief. Independent of any input and always
/// contract-valid.
pub fn fallback_brief() -> String {
    [
        "Video Intelligence Brief",
        "",
        "1. Central Theme",
        "Conceptual focus and intended value.",
        "",
        "2. Core Argument Flow",
        "The video develops its subject in stages, moving from framing context through supporting points toward a concluding position.",
        "",
        "3. Key Conceptual Sections",
        "An opening orientation, a main body of explanation, and a closing synthesis of the ideas presented.",
        "",
        "4. Primary Insights",
        "The material rewards attention to how its ideas connect rather than to any single detail in isolation.",
        "",
        "5. Intended Viewer Impact",
        "Viewers are left with a working conceptual map of the topic and a sense of where it applies.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::openai::MockCompletionClient;
    use super::*;

    fn request() -> BriefRequest {
        BriefRequest {
            transcript: "a talk about systems thinking and feedback loops".to_string(),
            video_url: "https://www.youtube.com/watch?v=abc123".to_string(),
            video_title: "Systems".to_string(),
        }
    }

    fn valid_brief() -> String {
        [
            "Video Intelligence Brief",
            "1. Central Theme",
            "Feedback loops shape outcomes.",
            "2. Core Argument Flow",
            "From definitions to dynamics.",
            "3. Key Conceptual Sections",
            "Stocks, flows, delays.",
            "4. Primary Insights",
            "Structure drives behavior.",
            "5. Intended Viewer Impact",
            "See systems everywhere.",
        ]
        .join("\n")
    }

    #[test]
    fn fallback_template_satisfies_the_contract() {
        assert!(validate_brief_format(&fallback_brief()));
    }

    #[test]
    fn fallback_template_carries_the_fixed_theme() {
        assert!(fallback_brief().contains("Conceptual focus and intended value."));
    }

    #[tokio::test]
    async fn empty_transcript_is_rejected() {
        let pipeline = BriefPipeline::without_client();
        let err = pipeline
            .generate(&BriefRequest {
                transcript: "   ".to_string(),
                video_url: String::new(),
                video_title: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VidbriefError::MissingTranscript));
    }

    #[tokio::test]
    async fn no_client_returns_basic_template() {
        let pipeline = BriefPipeline::without_client();
        let output = pipeline.generate(&request()).await.unwrap();
        assert_eq!(output.method, AnalysisMethod::Basic);
        assert!(validate_brief_format(&output.text));
    }

    #[tokio::test]
    async fn valid_completion_is_returned_as_primary() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| Ok(valid_brief()));

        let pipeline = BriefPipeline::with_client(Box::new(client));
        let output = pipeline.generate(&request()).await.unwrap();
        assert_eq!(output.method, AnalysisMethod::Primary);
        assert_eq!(output.text, valid_brief());
    }

    #[tokio::test]
    async fn missing_heading_substitutes_template() {
        let mut client = MockCompletionClient::new();
        client.expect_complete().returning(|_, _| {
            Ok(valid_brief().replace("4. Primary Insights", "4. Other"))
        });

        let pipeline = BriefPipeline::with_client(Box::new(client));
        let output = pipeline.generate(&request()).await.unwrap();
        assert_eq!(output.method, AnalysisMethod::FallbackFormat);
        assert!(output.text.contains("Conceptual focus and intended value."));
        assert!(validate_brief_format(&output.text));
    }

    #[tokio::test]
    async fn transcript_like_output_is_rejected_and_substituted() {
        let mut client = MockCompletionClient::new();
        client.expect_complete().returning(|_, _| {
            let padding = "word ".repeat(60);
            Ok(format!("{}\nAt 0:01:23 the host begins. {padding}", valid_brief()))
        });

        let pipeline = BriefPipeline::with_client(Box::new(client));
        let output = pipeline.generate(&request()).await.unwrap();
        assert_eq!(output.method, AnalysisMethod::FallbackFormat);
        assert!(validate_brief_format(&output.text));
    }

    #[tokio::test]
    async fn completion_error_substitutes_template() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| anyhow::bail!("connection refused"));

        let pipeline = BriefPipeline::with_client(Box::new(client));
        let output = pipeline.generate(&request()).await.unwrap();
        assert_eq!(output.method, AnalysisMethod::Fallback);
        assert!(validate_brief_format(&output.text));
    }

    #[tokio::test]
    async fn long_transcript_is_truncated_in_the_prompt() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .withf(|_, user| user.len() < TRANSCRIPT_PREVIEW_LIMIT + 500)
            .returning(|_, _| Ok(valid_brief()));

        let long_request = BriefRequest {
            transcript: "t".repeat(TRANSCRIPT_PREVIEW_LIMIT * 2),
            ..request()
        };

        let pipeline = BriefPipeline::with_client(Box::new(client));
        let output = pipeline.generate(&long_request).await.unwrap();
        assert_eq!(output.method, AnalysisMethod::Primary);
    }
}
