use axum::{Json, Router, extract::State, routing};
use serde_json::{Value, json};

use crate::common::{ApiError, AppState};

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", routing::get(health))
        .route("/count", routing::get(count))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

async fn count(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let length = state.store.count_pictures().await?;
    Ok(Json(json!({ "length": length })))
}
