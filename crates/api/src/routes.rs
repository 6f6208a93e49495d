use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stockpick_core::config::Settings;
use stockpick_core::domain::quote::StoredRecord;
use stockpick_core::pipeline::{PipelinePolicy, RankingPipeline};
use stockpick_core::storage::SqliteStore;

const ROOT_MESSAGE: &str = "Hello, Penny Stock Research API is running!";
const MISSING_API_KEY: &str = "Missing API Key";

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Option<SqliteStore>,
    /// Absent when no API key is configured.
    pub pipeline: Option<Arc<RankingPipeline>>,
}

pub fn build_router(state: AppState) -> Router {
    // Development posture: any origin, method and header.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/stocks", get(stocks))
        .route("/penny-stocks", get(penny_stocks))
        .route("/history/latest", get(history_latest))
        .route("/history/:date", get(history_by_date))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

/// Configuration problems are reported in the body with HTTP 200.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn root() -> Json<Message> {
    Json(Message {
        message: ROOT_MESSAGE,
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn stocks(State(state): State<AppState>) -> Response {
    let policy = PipelinePolicy::price_tier();
    run_ranking(&state, &state.settings.stock_symbols, &policy).await
}

async fn penny_stocks(State(state): State<AppState>) -> Response {
    let policy = PipelinePolicy::penny_stock(
        state.settings.penny_max_results,
        state.settings.penny_price_ceiling,
    );
    run_ranking(&state, &state.settings.penny_stock_symbols, &policy).await
}

async fn run_ranking(state: &AppState, symbols: &[String], policy: &PipelinePolicy) -> Response {
    let Some(pipeline) = &state.pipeline else {
        tracing::warn!(policy = policy.name(), "ranking requested without ALPHA_VANTAGE_API_KEY");
        return Json(ErrorBody {
            error: MISSING_API_KEY.to_string(),
        })
        .into_response();
    };

    let run_date = chrono::Local::now().date_naive();
    let result = pipeline.run(symbols, policy, run_date).await;
    Json(result).into_response()
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    policy: Option<String>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    date: NaiveDate,
    records: Vec<StoredRecord>,
}

async fn history_latest(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let Some(store) = &state.store else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };
    let policy = query.policy.as_deref();

    let date = store
        .latest_run_date(policy)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let records = store
        .records_for_date(date, policy)
        .await
        .map_err(internal_error)?;

    Ok(Json(HistoryResponse { date, records }))
}

async fn history_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, StatusCode> {
    let Some(store) = &state.store else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|_| StatusCode::BAD_REQUEST)?;

    let records = store
        .records_for_date(date, query.policy.as_deref())
        .await
        .map_err(internal_error)?;

    if records.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(HistoryResponse { date, records }))
}

fn internal_error(e: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&e);
    tracing::error!(error = %format!("{e:#}"), "history query failed");
    StatusCode::INTERNAL_SERVER_ERROR
}
