use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::comparison::{
    run_comparison, validate_mock_distance, ComparisonError, ComparisonReport, ComparisonRequest,
};
use crate::config::{Config, ProviderKind};
use crate::impact::ImpactSummary;
use crate::modes::{parse_mode_list, TransportMode};
use crate::progress::events::LogListener;
use crate::progress::store::SqliteStateStore;
use crate::progress::{local_today, ProgressSummary, ProgressTracker, RecordOutcome};
use crate::provider::google::GoogleRouteProvider;
use crate::provider::mock::MockRouteProvider;
use crate::provider::{provider_from_config, ProviderError, RouteProvider};
use crate::ranking::Preference;

#[derive(Clone)]
struct ApiState {
    config: Config,
    provider: Arc<dyn RouteProvider>,
    upstream: Arc<dyn RouteProvider>,
    db_path: PathBuf,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    message: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<ComparisonError> for ApiError {
    fn from(err: ComparisonError) -> Self {
        let status = match err {
            ComparisonError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ComparisonError::AllModesFailed(_) => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: err.message().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Deserialize)]
struct CompareRequest {
    origin: String,
    destination: String,
    modes: Option<Vec<String>>,
    preference: Option<String>,
    trips_per_week: Option<f64>,
    distance_km: Option<f64>,
    #[serde(default)]
    record: bool,
}

#[derive(Debug, Serialize)]
struct CompareResponse {
    report: ComparisonReport,
    progress: Option<RecordOutcome>,
}

#[derive(Debug, Serialize)]
struct RecordResponse {
    outcome: RecordOutcome,
    summary: ProgressSummary,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    provider: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsQuery {
    origin: Option<String>,
    destination: Option<String>,
    mode: Option<String>,
}

impl ApiState {
    fn from_config(config: Config) -> Self {
        Self {
            db_path: config.resolved_db_path(),
            provider: provider_from_config(&config, None),
            upstream: directions_upstream(&config),
            config,
        }
    }
}

pub async fn run_server(config: Config, bind: SocketAddr) -> Result<()> {
    let app = router(ApiState::from_config(config));
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed binding {bind}"))?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/directions", get(directions))
        .route("/v1/compare", post(compare))
        .route("/v1/progress", get(progress))
        .route("/v1/progress/record", post(record))
        .route("/v1/progress/reset", post(reset))
        .route("/v1/config", get(show_config))
        .layer(cors)
        .with_state(state)
}

/// Provider behind `GET /directions`. A proxy config would call back into
/// this server, so the proxy kind is served from Google directly.
fn directions_upstream(config: &Config) -> Arc<dyn RouteProvider> {
    match config.provider.kind {
        ProviderKind::Proxy => Arc::new(GoogleRouteProvider::new(
            crate::provider::google::DEFAULT_DIRECTIONS_URL,
            config.resolved_api_key(),
            config.provider.timeout_secs,
        )),
        ProviderKind::Mock | ProviderKind::Google => provider_from_config(config, None),
    }
}

async fn health(State(state): State<ApiState>) -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse {
        status: "ok",
        provider: state.provider.name().to_string(),
    })
}

async fn show_config(State(state): State<ApiState>) -> Json<ApiResponse<Config>> {
    let mut config = state.config;
    if !config.provider.api_key.is_empty() {
        config.provider.api_key = "***".to_string();
    }
    ok(config)
}

async fn directions(
    State(state): State<ApiState>,
    Query(query): Query<DirectionsQuery>,
) -> Response {
    let origin = query.origin.unwrap_or_default();
    let destination = query.destination.unwrap_or_default();
    if origin.trim().is_empty() || destination.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "origin and destination are required" })),
        )
            .into_response();
    }
    let mode = directions_mode(query.mode.as_deref());

    match state
        .upstream
        .fetch_route(origin.trim(), destination.trim(), mode)
        .await
    {
        Ok(leg) => Json(leg).into_response(),
        Err(ProviderError::NoRoute { detail, .. }) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No route found", "status": detail })),
        )
            .into_response(),
        Err(err) => {
            warn!("directions lookup failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Something went wrong" })),
            )
                .into_response()
        }
    }
}

async fn compare(
    State(state): State<ApiState>,
    Json(request): Json<CompareRequest>,
) -> ApiResult<CompareResponse> {
    let modes = match &request.modes {
        Some(raw) => parse_modes(raw)?,
        None => state.config.default_modes().map_err(ApiError::internal)?,
    };
    let preference = match request.preference.as_deref() {
        Some(raw) => Preference::from_str(raw).map_err(|e| ApiError::bad_request(e.to_string()))?,
        None => state.config.comparison.preference,
    };
    let comparison = ComparisonRequest {
        origin: request.origin,
        destination: request.destination,
        modes,
        preference,
        trips_per_week: request
            .trips_per_week
            .unwrap_or(state.config.comparison.trips_per_week),
    };

    let report = match request.distance_km {
        Some(km) => {
            validate_mock_distance(km)?;
            run_comparison(&MockRouteProvider::new(km), &comparison).await?
        }
        None => run_comparison(state.provider.as_ref(), &comparison).await?,
    };

    let progress = match (&report.impact, request.record) {
        (Some(impact), true) => {
            let store = open_store(&state)?;
            let tracker = tracker(&state, &store);
            Some(tracker.record_today(impact).map_err(ApiError::internal)?)
        }
        _ => None,
    };

    Ok(ok(CompareResponse { report, progress }))
}

async fn progress(State(state): State<ApiState>) -> ApiResult<ProgressSummary> {
    let store = open_store(&state)?;
    Ok(ok(tracker(&state, &store).summary_today()))
}

async fn record(
    State(state): State<ApiState>,
    Json(impact): Json<ImpactSummary>,
) -> ApiResult<RecordResponse> {
    impact
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let store = open_store(&state)?;
    let tracker = tracker(&state, &store);
    let outcome = tracker.record_today(&impact).map_err(ApiError::internal)?;
    let summary = tracker.summary_today();
    Ok(ok(RecordResponse { outcome, summary }))
}

async fn reset(State(state): State<ApiState>) -> ApiResult<ProgressSummary> {
    let store = open_store(&state)?;
    let cleared = tracker(&state, &store).reset().map_err(ApiError::internal)?;
    Ok(ok(ProgressSummary::as_of(&cleared, local_today())))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

fn open_store(state: &ApiState) -> std::result::Result<SqliteStateStore, ApiError> {
    SqliteStateStore::open(&state.db_path).map_err(ApiError::internal)
}

fn tracker<'a>(
    state: &ApiState,
    store: &'a SqliteStateStore,
) -> ProgressTracker<&'a SqliteStateStore> {
    let mut tracker = ProgressTracker::new(store);
    if state.config.notifications.log_progress {
        tracker.add_listener(Box::new(LogListener));
    }
    tracker
}

fn parse_modes(raw_modes: &[String]) -> std::result::Result<Vec<TransportMode>, ApiError> {
    parse_mode_list(&raw_modes.join(",")).map_err(|e| ApiError::bad_request(e.to_string()))
}

fn directions_mode(raw: Option<&str>) -> TransportMode {
    raw.and_then(|m| TransportMode::ALL.into_iter().find(|t| t.as_slug() == m))
        .unwrap_or(TransportMode::Driving)
}
