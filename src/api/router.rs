//! Statement analysis HTTP API.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. The router is generic over the chat
//! client so tests can drive it with a scripted mock.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::api::error::ApiError;
use crate::config::APP_VERSION;
use crate::pipeline::merge::merge_extractions;
use crate::pipeline::orchestrator::StatementAnalyzer;
use crate::pipeline::types::{AnalysisReport, ChatClient, StatementExtraction, DEFAULT_CURRENCY};
use crate::pipeline::validation::validate_payload;

/// Build the analysis API router.
pub fn api_router<C>(analyzer: Arc<StatementAnalyzer<C>>) -> Router
where
    C: ChatClient + Send + Sync + 'static,
{
    let routes = Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze::<C>))
        .route("/statements/merge", post(merge_statements::<C>))
        .with_state(analyzer);

    Router::new().nest("/api", routes).layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: APP_VERSION,
    })
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

/// Run the full pipeline over one statement text.
///
/// The pipeline does blocking HTTP calls to the extraction service, so it
/// runs on the blocking thread pool rather than the async runtime.
async fn analyze<C>(
    State(analyzer): State<Arc<StatementAnalyzer<C>>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisReport>, ApiError>
where
    C: ChatClient + Send + Sync + 'static,
{
    if req.text.trim().is_empty() {
        return Err(ApiError::BadRequest("text must not be empty".into()));
    }

    let report = tokio::task::spawn_blocking(move || analyzer.analyze(&req.text))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))??;

    Ok(Json(report))
}

#[derive(Deserialize)]
struct MergeRequest {
    statements: Vec<serde_json::Value>,
}

/// Merge extraction payloads without re-running extraction. Each statement
/// goes through the same structural validation as a chunk response; any
/// failure rejects the whole request.
async fn merge_statements<C>(
    State(_analyzer): State<Arc<StatementAnalyzer<C>>>,
    Json(req): Json<MergeRequest>,
) -> Result<Json<AnalysisReport>, ApiError>
where
    C: ChatClient + Send + Sync + 'static,
{
    if req.statements.is_empty() {
        return Err(ApiError::BadRequest("statements must not be empty".into()));
    }

    let mut payloads: Vec<StatementExtraction> = Vec::with_capacity(req.statements.len());
    for (i, value) in req.statements.iter().enumerate() {
        let payload =
            validate_payload(i, value).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        payloads.push(payload);
    }
    ensure_uniform_currency(&payloads)?;

    Ok(Json(merge_extractions(&payloads)))
}

/// Reject a merge across payloads that disagree on a detected currency.
/// The default "USD" sentinel means "not detected" and never conflicts.
fn ensure_uniform_currency(statements: &[StatementExtraction]) -> Result<(), ApiError> {
    let mut detected: Option<&str> = None;
    for statement in statements {
        let currency = statement.metadata.currency.as_str();
        if currency.is_empty() || currency == DEFAULT_CURRENCY {
            continue;
        }
        match detected {
            None => detected = Some(currency),
            Some(first) if first != currency => {
                return Err(ApiError::BadRequest(format!(
                    "statements mix currencies: {first} and {currency}"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
