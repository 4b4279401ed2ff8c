use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::brief::{BriefPipeline, BriefRequest};
use crate::captions::{AcquisitionPipeline, TranscriptOutcome};
use crate::config::Config;
use crate::locator::VideoLocator;
use crate::Result;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub acquisition: Arc<AcquisitionPipeline>,
    pub briefs: Arc<BriefPipeline>,
    pub debug_requests: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            acquisition: Arc::new(AcquisitionPipeline::from_config(&config.extraction)?),
            briefs: Arc::new(BriefPipeline::from_config(&config.completion)?),
            debug_requests: config.server.debug_requests,
        })
    }
}

/// Build the API router. The `/api/yt/*` routes are aliases kept for clients
/// of the original endpoint layout; both spellings hit the same handlers.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/transcript", post(transcript))
        .route("/api/yt/transcript", post(transcript))
        .route("/api/analyze", post(analyze))
        .route("/api/yt/analyze", post(analyze))
        .layer(cors)
        .with_state(state)
}

/// Bind and run the HTTP service until shutdown.
pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let router = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("listening on http://{addr}");
    axum::serve(listener, router).await.context("server error")?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct TranscriptBody {
    #[serde(default)]
    url: Option<String>,
}

async fn transcript(State(state): State<AppState>, Json(body): Json<TranscriptBody>) -> Response {
    let Some(url) = body.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing url" })),
        )
            .into_response();
    };

    let locator = match VideoLocator::parse(&url) {
        Ok(locator) => locator,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, video_id = %locator.video_id, "transcript request");

    match state.acquisition.acquire(&locator).await {
        TranscriptOutcome::Available(transcript) => (
            StatusCode::OK,
            Json(json!({
                "transcript": transcript.text,
                "source": transcript.source,
                "length": transcript.char_len(),
            })),
        )
            .into_response(),
        TranscriptOutcome::Unavailable(diagnostics) => {
            tracing::warn!(%request_id, video_id = %diagnostics.video_id, "transcript unavailable");
            (StatusCode::NOT_FOUND, Json(diagnostics)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody {
    #[serde(default)]
    transcript: Option<String>,

    #[serde(default)]
    video_url: Option<String>,

    #[serde(default)]
    video_title: Option<String>,

    /// Present only when a client confuses this endpoint with the transcript
    /// one; used for the format-confusion guard.
    #[serde(default)]
    url: Option<String>,
}

impl AnalyzeBody {
    fn received_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.transcript.is_some() {
            fields.push("transcript");
        }
        if self.video_url.is_some() {
            fields.push("videoUrl");
        }
        if self.video_title.is_some() {
            fields.push("videoTitle");
        }
        if self.url.is_some() {
            fields.push("url");
        }
        fields
    }
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalyzeBody>) -> Response {
    let request_id = Uuid::new_v4();

    if state.debug_requests {
        tracing::debug!(
            %request_id,
            received = ?body.received_fields(),
            transcript_chars = body.transcript.as_deref().map(|t| t.chars().count()),
            "analyze request shape"
        );
    }

    let transcript_missing = body
        .transcript
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .is_empty();

    if transcript_missing && body.url.is_some() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Received 'url' instead of 'transcript'",
                "hint": "The analyze endpoint expects { transcript, videoUrl, videoTitle }; this body looks like a transcript request",
                "received": body.received_fields(),
            })),
        )
            .into_response();
    }

    let request = BriefRequest {
        transcript: body.transcript.unwrap_or_default(),
        video_url: body.video_url.unwrap_or_default(),
        video_title: body.video_title.unwrap_or_default(),
    };

    match state.briefs.generate(&request).await {
        Ok(output) => {
            tracing::info!(%request_id, method = ?output.method, "brief generated");
            (
                StatusCode::OK,
                Json(json!({
                    "briefText": output.text,
                    "analysisMethod": output.method,
                    "generatedAt": output.generated_at,
                })),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
