use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::scanner::filter::FilterOverrides;
use crate::scanner::pipeline::{PipelineOutcome, PipelineRunner};
use crate::scanner::record::ScanBatch;
use crate::scanner::Scanner;
use crate::stages::AnalysisStages;

pub struct AppState {
    pub scanner: Scanner,
    pub stages: Arc<dyn AnalysisStages>,
    pub config: AppConfig,
    /// Latest completed batch; swapped wholesale when a scan finishes, so
    /// readers always observe a complete batch.
    pub latest: RwLock<Option<Arc<ScanBatch>>>,
}

pub async fn run_server(state: Arc<AppState>) {
    let bind = state.config.api.bind.clone();
    let app = Router::new()
        .route("/scan", post(run_scan))
        .route("/analyze/{symbol}", get(analyze_symbol))
        .route("/results", get(latest_results))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind).await.unwrap();
    info!("API Server listening on {}", bind);
    axum::serve(listener, app).await.unwrap();
}

#[derive(Default, serde::Deserialize)]
struct ScanRequest {
    #[serde(default)]
    filters: Option<FilterOverrides>,
}

async fn run_scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> impl IntoResponse {
    let filter = match &req.filters {
        Some(overrides) => overrides.apply(&state.config.filters),
        None => state.config.filters.clone(),
    };
    let symbols = state.config.resolve_symbols();

    let batch = Arc::new(state.scanner.scan(&symbols, &filter).await);
    *state.latest.write().await = Some(batch.clone());

    Json(json!({
        "success": true,
        "count": batch.records.len(),
        "results": batch.records,
        "snapshot_path": batch.snapshot_path,
    }))
    .into_response()
}

async fn analyze_symbol(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();
    let runner = PipelineRunner::new(state.stages.clone());

    match runner.evaluate(&symbol).await {
        PipelineOutcome::Record(record) => {
            Json(json!({"success": true, "result": *record})).into_response()
        }
        PipelineOutcome::Skipped { stage, reason } => {
            error!("Analysis of {} failed at {}: {}", symbol, stage, reason);
            (
                axum::http::StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": format!("Failed to analyze {} ({} stage: {})", symbol, stage, reason),
                })),
            )
                .into_response()
        }
    }
}

async fn latest_results(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let latest = state.latest.read().await.clone();
    match latest {
        Some(batch) => Json(json!({
            "success": true,
            "completed_at": batch.completed_at,
            "count": batch.records.len(),
            "results": batch.records,
        }))
        .into_response(),
        None => (
            axum::http::StatusCode::NOT_FOUND,
            "No scan has completed yet. POST /scan first.",
        )
            .into_response(),
    }
}
