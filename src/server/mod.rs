//! HTTP接口：对比请求、会话查询、数据源列表与健康检查

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::error::CompareError;
use crate::generator::context::GeneratorContext;
use crate::generator::workflow::{run_guarded, validate_request};
use crate::logging::RequestLog;
use crate::session::SessionStore;
use crate::types::ComparisonRequest;

/// 响应头：本次对比的会话ID
pub const SESSION_HEADER: &str = "x-session-id";

/// 各处理器共享的服务状态
#[derive(Clone)]
pub struct AppState {
    pub context: GeneratorContext,
    pub sessions: SessionStore,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(context: GeneratorContext) -> Self {
        let ttl = Duration::from_secs(context.config.session.ttl_seconds);
        Self {
            context,
            sessions: SessionStore::new(ttl),
            startup_time: Utc::now(),
        }
    }
}

/// 构建路由
pub fn build_router(state: AppState) -> Router {
    let cors_allow_any = state.context.config.server.cors_allow_any;

    let api = Router::new()
        .route("/api/compare", post(compare_products))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sources", get(list_sources));

    let mut router = Router::new()
        .merge(api)
        .merge(health_routes())
        .with_state(state);

    if cors_allow_any {
        router = router.layer(CorsLayer::permissive());
    }
    router.layer(TraceLayer::new_for_http())
}

/// POST /api/compare
async fn compare_products(
    State(state): State<AppState>,
    payload: Result<Json<ComparisonRequest>, JsonRejection>,
) -> Result<Response, CompareError> {
    let Json(request) = payload.map_err(|rejection| CompareError::validation(rejection.body_text()))?;
    validate_request(&request)?;

    let session_id = state
        .sessions
        .begin(request.product1.trim(), request.product2.trim())
        .await;
    tracing::info!(
        %session_id,
        product1 = %request.product1,
        product2 = %request.product2,
        "comparison requested"
    );

    let result = run_guarded(
        state.context.clone(),
        request,
        RequestLog::new(),
        Some((state.sessions.clone(), session_id)),
    )
    .await?;

    let header_value = HeaderValue::from_str(&session_id.to_string())
        .map_err(|e| CompareError::Unexpected {
            details: e.to_string(),
            logs: result.logs.clone(),
        })?;

    Ok((
        [(HeaderName::from_static(SESSION_HEADER), header_value)],
        Json(result),
    )
        .into_response())
}

/// GET /api/sessions/:id
async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let session = match Uuid::parse_str(&id) {
        Ok(id) => state.sessions.get(id).await,
        Err(_) => None,
    };

    match session {
        Some(info) => Json(info).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Session not found",
                "details": format!("No active session with id {}", id),
            })),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct SourcesResponse {
    pub methods: Vec<String>,
}

/// GET /api/sources
async fn list_sources(State(state): State<AppState>) -> Json<SourcesResponse> {
    Json(SourcesResponse {
        methods: state.context.sources.ids(),
    })
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
    })
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
