use axum::{body::Bytes, extract::State, http::StatusCode, response::Html, Json};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{Product, RecommendationRequest};
use crate::services::{dashboard, recommendations};

use super::{AggregatorState, RecommenderState};

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Computes category winners and forwards them to the aggregator
///
/// The body is parsed by hand so that any malformed or mis-shaped payload is
/// a 400, whatever its content type.
///
/// The response body is the computed recommendations, not the bytes the
/// aggregator sent back. The aggregator never replies, so echoing its reply
/// would always produce an empty body; the reply length is only logged.
pub async fn recommend(
    State(state): State<RecommenderState>,
    body: Bytes,
) -> AppResult<Json<Vec<Product>>> {
    let request: RecommendationRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid JSON format: {}", e)))?;

    let ids = request.ids();
    tracing::info!(requested = ids.len(), "Processing recommendation request");

    let result = recommendations::compute(&ids, &state.catalog);

    let reply = state.forwarder.send(&result.products).await.map_err(|e| {
        tracing::error!(error = %e, "Forwarding recommendations failed");
        AppError::from(e)
    })?;

    tracing::info!(
        recommended = result.products.len(),
        unknown = result.unknown_ids.len(),
        reply_bytes = reply.len(),
        "Recommendations forwarded"
    );

    Ok(Json(result.products))
}

/// Renders everything accumulated so far
pub async fn dashboard(State(state): State<AggregatorState>) -> Html<String> {
    let snapshot = state.store.snapshot().await;
    Html(dashboard::render_page(&snapshot))
}
