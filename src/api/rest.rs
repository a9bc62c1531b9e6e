// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. There is no authentication; the
// service carries no credentials or account state.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;
use crate::sort::{sort_records, SortDirection, SortKey};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(full_state))
        .route("/api/v1/stocks", get(stocks))
        .route("/api/v1/stocks/:symbol", get(stock_detail))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/sort", post(select_sort))
        .route("/api/v1/refresh", post(trigger_refresh))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "state_version": state.current_state_version(),
        "server_time": chrono::Utc::now().timestamp_millis(),
    }))
}

// =============================================================================
// Full state snapshot
// =============================================================================

async fn full_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.build_snapshot();
    Json(snapshot)
}

// =============================================================================
// Stock batch (sorted)
// =============================================================================

#[derive(Deserialize)]
struct StocksQuery {
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    dir: Option<String>,
}

/// Return the record batch ordered by the requested field.
///
/// Without explicit params, the shared sort selection applies (initially
/// `mom42` descending). An unknown sort key or direction is a caller
/// mistake and gets a 400.
async fn stocks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StocksQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let default = *state.sort_state.read();

    let key = match &query.sort {
        Some(raw) => SortKey::parse(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": format!("unknown sort key: '{raw}'"),
                })),
            )
        })?,
        None => default.key,
    };

    let direction = match &query.dir {
        Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": format!("invalid sort direction: '{raw}' (use 'asc' or 'desc')"),
                })),
            )
        })?,
        None => default.direction,
    };

    let records = state.records.read().clone();
    Ok(Json(sort_records(&records, key, direction)))
}

// =============================================================================
// Stock detail
// =============================================================================

/// Look up one symbol. An absent symbol is a negative result, not a fault:
/// the caller renders "no detail available" and the rest of the view stands.
async fn stock_detail(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    match state.get_record(&symbol) {
        Some(record) => Ok(Json(record)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("no detail available for symbol '{symbol}'"),
            })),
        )),
    }
}

// =============================================================================
// Sort selection
// =============================================================================

#[derive(Deserialize)]
struct SortSelectRequest {
    key: String,
}

/// Apply a column selection to the shared sort state. Re-selecting the
/// current key while descending flips to ascending; any other selection
/// resets to descending.
async fn select_sort(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SortSelectRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let key = SortKey::parse(&req.key).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("unknown sort key: '{}'", req.key),
            })),
        )
    })?;

    let selected = state.select_sort(key);
    info!(key = ?selected.key, direction = ?selected.direction, "sort selection updated");
    Ok(Json(selected))
}

// =============================================================================
// Stats
// =============================================================================

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.records.read().clone();
    let last_update = *state.last_update.read();
    Json(crate::stats::compute_stats(
        &records,
        last_update,
        state.sentiment_source.as_ref(),
    ))
}

// =============================================================================
// Refresh trigger
// =============================================================================

/// Kick off a refresh in the background. The guard is claimed here, before
/// the response, so of two racing requests exactly one gets `started: true`
/// and the loading flag is already set when that response leaves. The loser
/// is ignored and told so.
async fn trigger_refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.try_begin_refresh() {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "started": false,
                "refreshing": true,
                "message": "refresh already in flight",
            })),
        );
    }

    let refresh_state = state.clone();
    tokio::spawn(async move {
        refresh_state.finish_refresh().await;
    });
    info!("refresh triggered via API");

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "started": true,
            "refreshing": true,
            "message": "refresh started",
        })),
    )
}
