use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use vidbrief::brief::{validate_brief_format, BriefPipeline};
use vidbrief::captions::{
    AcquisitionPipeline, CaptionTool, ExtractionStrategy, FetchedArtifact, VideoMetadata,
};
use vidbrief::server::{build_router, AppState};
use vidbrief::Result;

/// Caption tool that never finds captions and serves fixed metadata.
struct NoCaptionsTool {
    metadata: VideoMetadata,
}

#[async_trait]
impl CaptionTool for NoCaptionsTool {
    async fn list_tracks(&self, _watch_url: &str) -> Result<String> {
        Ok(String::new())
    }

    async fn fetch_captions(
        &self,
        _watch_url: &str,
        _video_id: &str,
        _strategy: &ExtractionStrategy,
        _dest_dir: &Path,
    ) -> Result<Option<FetchedArtifact>> {
        Ok(None)
    }

    async fn fetch_metadata(&self, _watch_url: &str) -> Result<VideoMetadata> {
        Ok(self.metadata.clone())
    }
}

fn router_with_metadata(metadata: VideoMetadata) -> axum::Router {
    let state = AppState {
        acquisition: Arc::new(
            AcquisitionPipeline::with_tool(Arc::new(NoCaptionsTool { metadata })).unwrap(),
        ),
        briefs: Arc::new(BriefPipeline::without_client()),
        debug_requests: false,
    };
    build_router(state)
}

async fn post_json(
    router: axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_endpoint_responds() {
    let router = router_with_metadata(VideoMetadata::default());
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn transcript_rejects_missing_url() {
    let router = router_with_metadata(VideoMetadata::default());
    let (status, body) = post_json(router, "/api/transcript", serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing url");
}

#[tokio::test]
async fn transcript_rejects_invalid_locator() {
    let router = router_with_metadata(VideoMetadata::default());
    let (status, body) = post_json(
        router,
        "/api/transcript",
        serde_json::json!({ "url": "https://www.youtube.com/feed/trending" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Invalid video locator"));
}

#[tokio::test]
async fn transcript_total_failure_returns_diagnostics() {
    let router = router_with_metadata(VideoMetadata::default());
    let (status, body) = post_json(
        router,
        "/api/transcript",
        serde_json::json!({ "url": "https://youtube.com/watch?v=abc123&list=XYZ" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["videoId"], "abc123");
    assert_eq!(body["error"], "No transcript available");
    assert!(body["hint"].as_str().is_some());
    assert!(body["troubleshooting"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
}

#[tokio::test]
async fn transcript_uses_description_fallback() {
    let description = "d".repeat(80);
    let router = router_with_metadata(VideoMetadata {
        title: Some("Demo video".to_string()),
        description: Some(description.clone()),
    });

    let (status, body) = post_json(
        router,
        "/api/yt/transcript",
        serde_json::json!({ "url": "https://youtube.com/watch?v=abc123" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "description_fallback");
    assert_eq!(
        body["transcript"],
        serde_json::json!(format!("Demo video. {description}"))
    );
    assert!(body["length"].as_u64().unwrap() > 80);
}

#[tokio::test]
async fn analyze_guards_against_transcript_request_format() {
    let router = router_with_metadata(VideoMetadata::default());
    let (status, body) = post_json(
        router,
        "/api/analyze",
        serde_json::json!({ "url": "https://youtube.com/watch?v=abc123" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["hint"].as_str().is_some());
    assert!(body["received"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "url"));
}

#[tokio::test]
async fn analyze_rejects_empty_transcript() {
    let router = router_with_metadata(VideoMetadata::default());
    let (status, body) = post_json(
        router,
        "/api/analyze",
        serde_json::json!({ "transcript": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Transcript is missing or empty");
}

#[tokio::test]
async fn analyze_without_credential_returns_basic_brief() {
    let router = router_with_metadata(VideoMetadata::default());
    let (status, body) = post_json(
        router,
        "/api/yt/analyze",
        serde_json::json!({
            "transcript": "a long enough discussion of systems thinking",
            "videoUrl": "https://www.youtube.com/watch?v=abc123",
            "videoTitle": "Systems",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analysisMethod"], "basic");
    let text = body["briefText"].as_str().unwrap();
    assert!(validate_brief_format(text));
}
