//! Moodline Gateway: sentiment-over-time API for typed text and video captions.
//! Models are loaded once at startup into an `AnalysisContext` shared by every request.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use moodline_core::{AnalysisContext, AnalysisError, BackendKind, MoodlineConfig};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct AppState {
    config: Arc<MoodlineConfig>,
    analysis: Arc<AnalysisContext>,
}

#[derive(Deserialize)]
struct TextRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    use_custom_model: bool,
}

#[derive(Deserialize)]
struct VideoRequest {
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    use_custom_model: bool,
}

type ApiError = (StatusCode, Json<Value>);

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[moodline-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match MoodlineConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Config load failed: {}", e);
            std::process::exit(1);
        }
    };

    // Models must be in memory before the listener accepts anything.
    let analysis = match AnalysisContext::from_config(&config) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Model initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr();
    let app_name = config.app_name.clone();
    let app = build_app(AppState {
        config: Arc::new(config),
        analysis: Arc::new(analysis),
    });

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("{} {} listening on {}", app_name, moodline_core::version(), addr);

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown initiated (Ctrl+C received)");
    }
}

fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs));

    Router::new()
        .route("/health", get(health))
        .route("/api/analyze-text", post(analyze_text_handler))
        .route("/api/analyze-text-prog", post(analyze_text_prog_handler))
        .route("/api/analyze-youtube", post(analyze_youtube_handler))
        .with_state(state)
        .layer(timeout)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_request))
}

/// Configured origins, or any origin when none are configured (dev UI on another port).
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

async fn log_request(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "-".to_string());
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "moodline::gateway",
        %method,
        path = %path,
        peer = %peer,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request served"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}

/// User errors -> 400, collaborator failures -> 502, everything else -> 500.
fn api_error(err: AnalysisError) -> ApiError {
    let status = if err.is_user_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_upstream() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    if status.is_server_error() {
        tracing::error!(target: "moodline::gateway", "analysis failed: {}", err);
    }
    (status, Json(json!({ "error": err.to_string() })))
}

/// POST /api/analyze-text: one overall [negative, positive] pair for the text.
async fn analyze_text_handler(
    State(state): State<AppState>,
    Json(body): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = body.text.unwrap_or_default();
    let score = state
        .analysis
        .analyze_text_overall(&text, BackendKind::from_flag(body.use_custom_model))
        .await
        .map_err(api_error)?;

    Ok(Json(json!({
        "message": "Text analyzed successfully",
        "result": score,
    })))
}

/// POST /api/analyze-text-prog: [negative, positive, start_word_index] per chunk.
async fn analyze_text_prog_handler(
    State(state): State<AppState>,
    Json(body): Json<TextRequest>,
) -> Result<Json<Value>, ApiError> {
    let text = body.text.unwrap_or_default();
    let result = state
        .analysis
        .analyze_text_progression(&text, BackendKind::from_flag(body.use_custom_model))
        .await
        .map_err(api_error)?;

    Ok(Json(json!({
        "message": "Text analyzed successfully",
        "result": result,
    })))
}

/// POST /api/analyze-youtube: [negative, positive, start_seconds] per time bucket.
async fn analyze_youtube_handler(
    State(state): State<AppState>,
    Json(body): Json<VideoRequest>,
) -> Result<Json<Value>, ApiError> {
    let video_id = body.video_id.unwrap_or_default();
    let result = state
        .analysis
        .analyze_video(&video_id, BackendKind::from_flag(body.use_custom_model))
        .await
        .map_err(api_error)?;

    Ok(Json(json!({
        "message": "Video analyzed successfully",
        "result": result,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moodline_core::{AnalysisResult, Cue, SentimentBackend, SentimentScore, TranscriptProvider};
    use tower::ServiceExt;

    struct FixedBackend(f64);

    #[async_trait]
    impl SentimentBackend for FixedBackend {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score_batch(&self, texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
            Ok(texts.iter().map(|_| SentimentScore::from_positive(self.0)).collect())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl SentimentBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        async fn score_batch(&self, _texts: &[String]) -> AnalysisResult<Vec<SentimentScore>> {
            Err(AnalysisError::Backend("inference endpoint 503: loading".to_string()))
        }
    }

    struct StubTranscript;

    #[async_trait]
    impl TranscriptProvider for StubTranscript {
        async fn fetch_cues(&self, video_id: &str) -> AnalysisResult<Vec<Cue>> {
            match video_id {
                "abc123" => Ok(vec![
                    Cue::new(0.0, 4.0, "hello"),
                    Cue::new(45.0, 4.0, "world"),
                ]),
                other => Err(AnalysisError::Transcript(format!("no captions for video {}", other))),
            }
        }
    }

    fn test_app() -> Router {
        let analysis = AnalysisContext::new(Arc::new(StubTranscript))
            .with_backend(BackendKind::Custom, Arc::new(FixedBackend(1.0)))
            .with_backend(BackendKind::Pretrained, Arc::new(FailingBackend));
        build_app(AppState {
            config: Arc::new(MoodlineConfig::default()),
            analysis: Arc::new(analysis),
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let res = test_app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_analyze_text_prog_single_chunk() {
        let (status, json) = post_json(
            test_app(),
            "/api/analyze-text-prog",
            json!({ "text": "good good good", "use_custom_model": true }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"], json!([[0.0, 1.0, 0]]));
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_text_prog_requires_text() {
        let (status, json) = post_json(test_app(), "/api/analyze-text-prog", json!({ "use_custom_model": true })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("No text provided"));

        let (status, _) = post_json(test_app(), "/api/analyze-text-prog", json!({ "text": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_text_overall() {
        let (status, json) = post_json(
            test_app(),
            "/api/analyze-text",
            json!({ "text": "what a lovely day", "use_custom_model": true }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["result"], json!([0.0, 1.0]));
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let (status, json) = post_json(
            test_app(),
            "/api/analyze-text-prog",
            json!({ "text": "anything at all", "use_custom_model": false }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_analyze_youtube_buckets() {
        let (status, json) = post_json(
            test_app(),
            "/api/analyze-youtube",
            json!({ "video_id": "abc123", "use_custom_model": true }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // 49s of captions -> 20s buckets; bucket 1 has no cues.
        assert_eq!(
            json["result"],
            json!([[0.0, 1.0, 0.0], [0.5, 0.5, 20.0], [0.0, 1.0, 45.0]])
        );
    }

    #[tokio::test]
    async fn test_analyze_youtube_errors() {
        let (status, _) = post_json(test_app(), "/api/analyze-youtube", json!({ "video_id": "" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = post_json(
            test_app(),
            "/api/analyze-youtube",
            json!({ "video_id": "nocaptions", "use_custom_model": true }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["error"].as_str().unwrap().contains("no captions"));
    }

    fn app_with_origins(origins: &[&str]) -> Router {
        let config = MoodlineConfig {
            cors_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..MoodlineConfig::default()
        };
        let analysis = AnalysisContext::new(Arc::new(StubTranscript))
            .with_backend(BackendKind::Custom, Arc::new(FixedBackend(1.0)));
        build_app(AppState {
            config: Arc::new(config),
            analysis: Arc::new(analysis),
        })
    }

    async fn preflight(app: Router, origin: &str) -> Option<String> {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/analyze-text-prog")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        res.headers()
            .get("access-control-allow-origin")
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_cors_allows_only_configured_origins() {
        let origins = ["http://localhost:5173", "not a header\n"];
        assert_eq!(
            preflight(app_with_origins(&origins), "http://localhost:5173").await.as_deref(),
            Some("http://localhost:5173")
        );
        assert_eq!(preflight(app_with_origins(&origins), "http://evil.example").await, None);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin_when_unconfigured() {
        assert_eq!(
            preflight(app_with_origins(&[]), "http://anywhere.example").await.as_deref(),
            Some("*")
        );
    }
}
