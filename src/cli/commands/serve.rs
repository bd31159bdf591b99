//! HTTP API server.
//!
//! Exposes script generation, style extraction, raw structured completion and
//! article extraction as JSON endpoints.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{ErrorKind, SegueError, Stage};
use crate::orchestrator::{Orchestrator, RequestShape, ScriptRequest, StyleRequest};
use crate::script::ScriptResult;
use crate::style::{StyleProfile, StyleSelection};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let app = router(Arc::new(AppState { orchestrator }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Segue API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Scripts", "POST /api/scripts");
    Output::kv("Style", "POST /api/style");
    Output::kv("Complete JSON", "POST /api/complete-json");
    Output::kv("Extract", "POST /api/extract");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/scripts", post(scripts))
        .route("/api/style", post(style))
        .route("/api/complete-json", post(complete_json))
        .route("/api/extract", post(extract))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

fn default_pg_safe() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ScriptsBody {
    #[serde(default)]
    story: String,
    #[serde(default)]
    song_title: String,
    #[serde(default)]
    artist: String,
    #[serde(default)]
    style: Option<String>,
    #[serde(default = "default_pg_safe")]
    pg_safe: bool,
    /// Profile to use when `style` is `personal`; falls back to the saved one.
    #[serde(default)]
    personal_style: Option<StyleProfile>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleBody {
    #[serde(default)]
    description: String,
    #[serde(default)]
    samples: Vec<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CompleteJsonBody {
    #[serde(default)]
    mode: String,
    #[serde(default)]
    prompt: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractBody {
    #[serde(default)]
    url: String,
}

#[derive(Serialize)]
struct Success<T> {
    ok: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached: Option<bool>,
}

impl<T: Serialize> Success<T> {
    fn new(data: T) -> Json<Self> {
        Json(Self {
            ok: true,
            data,
            cached: None,
        })
    }
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    kind: ErrorKind,
    stage: Stage,
    message: String,
}

/// A [`SegueError`] rendered as an HTTP response.
struct ApiError(SegueError);

impl From<SegueError> for ApiError {
    fn from(e: SegueError) -> Self {
        Self(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SegueError::Validation(rejection.body_text()))
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Extraction | ErrorKind::Provider | ErrorKind::SchemaValidation => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::Cache | ErrorKind::Config | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = status_for(kind);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }

        let body = ErrorBody {
            ok: false,
            error: ErrorDetail {
                kind,
                stage: self.0.stage(),
                message: self.0.user_message(),
            },
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn scripts(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ScriptsBody>, JsonRejection>,
) -> ApiResult<Json<Success<ScriptResult>>> {
    let Json(body) = body?;

    let style = StyleSelection::resolve_saved(
        body.style.as_deref().unwrap_or_default(),
        body.personal_style,
        &state.orchestrator.settings().personal_style_path(),
    )?;

    let request = ScriptRequest {
        story: body.story,
        song_title: body.song_title,
        artist: body.artist,
        style,
        pg_safe: body.pg_safe,
    };

    let generated = state.orchestrator.generate_scripts(&request).await?;
    Ok(Json(Success {
        ok: true,
        data: generated.result,
        cached: Some(generated.cached),
    }))
}

async fn style(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<StyleBody>, JsonRejection>,
) -> ApiResult<Json<Success<StyleProfile>>> {
    let Json(body) = body?;
    let request = StyleRequest {
        description: body.description,
        samples: body.samples,
    };

    let profile = state.orchestrator.create_style_profile(&request).await?;
    Ok(Success::new(profile))
}

async fn complete_json(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CompleteJsonBody>, JsonRejection>,
) -> ApiResult<Json<Success<serde_json::Value>>> {
    let Json(body) = body?;
    let shape: RequestShape = body.mode.parse().map_err(SegueError::Validation)?;

    let value = state.orchestrator.complete_prompt(shape, &body.prompt).await?;
    Ok(Success::new(value))
}

async fn extract(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<ExtractBody>, JsonRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Json(body) = body?;
    let text = state.orchestrator.extract(&body.url).await?;
    Ok(Json(serde_json::json!({ "text": text })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::config::Prompts;
    use crate::extract::Extractor;
    use crate::provider::mock::ScriptedProvider;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct FixedExtractor;

    #[async_trait]
    impl Extractor for FixedExtractor {
        async fn extract_text(&self, _url: &str) -> crate::Result<String> {
            Ok("Article body".to_string())
        }
    }

    fn state(provider: ScriptedProvider) -> Arc<AppState> {
        state_in(
            provider,
            &std::env::temp_dir().join("segue-serve-tests-no-personal-style"),
        )
    }

    fn state_in(provider: ScriptedProvider, data_dir: &std::path::Path) -> Arc<AppState> {
        let mut settings = Settings::default();
        settings.general.data_dir = data_dir.display().to_string();

        Arc::new(AppState {
            orchestrator: Orchestrator::with_components(
                settings,
                Prompts::default(),
                Arc::new(provider),
                Arc::new(FixedExtractor),
                Some(Arc::new(MemoryCacheStore::new())),
            ),
        })
    }

    fn scripts_reply() -> String {
        json!({
            "storyDetails": "Bakery gives away bread",
            "songAnalysis": "Hope and warmth",
            "whyThisWorks": "Sunlight after hardship",
            "scripts": [
                {"script": "long", "deliveryNotes": "slow"},
                {"script": "medium", "deliveryNotes": "steady"},
                {"script": "short", "deliveryNotes": "quick"}
            ]
        })
        .to_string()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn scripts_body(value: Value) -> std::result::Result<Json<ScriptsBody>, JsonRejection> {
        Ok(Json(serde_json::from_value(value).unwrap()))
    }

    #[tokio::test]
    async fn test_scripts_success_then_cached() {
        let state = state(ScriptedProvider::new([scripts_reply()]));
        let request = json!({
            "story": "Local bakery donates 1000 loaves",
            "songTitle": "Here Comes the Sun",
            "artist": "The Beatles",
            "style": "touching",
            "pgSafe": true
        });

        let first = scripts(State(state.clone()), scripts_body(request.clone()))
            .await
            .into_response();
        assert_eq!(first.status(), StatusCode::OK);
        let first = body_json(first).await;
        assert_eq!(first["ok"], true);
        assert_eq!(first["cached"], false);
        assert_eq!(first["data"]["scripts"].as_array().unwrap().len(), 3);

        let second = body_json(
            scripts(State(state), scripts_body(request))
                .await
                .into_response(),
        )
        .await;
        assert_eq!(second["cached"], true);
        assert_eq!(second["data"], first["data"]);
    }

    #[tokio::test]
    async fn test_scripts_validation_error_shape() {
        let state = state(ScriptedProvider::new([scripts_reply()]));
        let response = scripts(
            State(state),
            scripts_body(json!({"story": "", "songTitle": "x", "artist": "y"})),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["kind"], "validation");
        assert_eq!(body["error"]["stage"], "input");
    }

    #[tokio::test]
    async fn test_scripts_personal_without_profile() {
        let state = state(ScriptedProvider::new([scripts_reply()]));
        let response = scripts(
            State(state),
            scripts_body(json!({
                "story": "s", "songTitle": "t", "artist": "a", "style": "personal"
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_preset_style_ignores_corrupt_personal_style() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("personal_style.json"), "{ not json").unwrap();
        let state = state_in(ScriptedProvider::new([scripts_reply()]), dir.path());

        let response = scripts(
            State(state),
            scripts_body(json!({
                "story": "Local bakery donates 1000 loaves",
                "songTitle": "Here Comes the Sun",
                "artist": "The Beatles",
                "style": "touching",
                "pgSafe": true
            })),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_schema_failure_maps_to_bad_gateway() {
        let state = state(ScriptedProvider::repeating("not json"));
        let response = scripts(
            State(state),
            scripts_body(json!({"story": "s", "songTitle": "t", "artist": "a"})),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["kind"], "schema_validation");
        assert_eq!(body["error"]["stage"], "generation");
        assert!(body["error"]["message"].as_str().unwrap().chars().count() <= 800);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let parsed: std::result::Result<ScriptsBody, _> = serde_json::from_value(json!({
            "story": "s", "songTitle": "t", "artist": "a", "tone": "sad"
        }));
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_complete_json_bad_mode() {
        let state = state(ScriptedProvider::new([scripts_reply()]));
        let body = CompleteJsonBody {
            mode: "poem".to_string(),
            prompt: "hi".to_string(),
        };
        let response = complete_json(State(state), Ok(Json(body)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let state = state(ScriptedProvider::new(Vec::<String>::new()));

        let ok = extract(
            State(state.clone()),
            Ok(Json(ExtractBody {
                url: "https://example.com/story".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(ok.status(), StatusCode::OK);
        assert_eq!(body_json(ok).await["text"], "Article body");

        let bad = extract(
            State(state),
            Ok(Json(ExtractBody {
                url: "not a url".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Extraction), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Provider), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorKind::Cache), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
