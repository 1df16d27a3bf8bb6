use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing,
};
use serde_json::json;

use crate::{
    common::{ApiError, AppState, PictureBody, metrics},
    db::Picture,
};

pub fn picture_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/picture",
            routing::get(list_pictures).post(create_picture),
        )
        .route(
            "/picture/{id}",
            routing::get(get_picture)
                .put(update_picture)
                .delete(delete_picture),
        )
}

async fn list_pictures(State(state): State<AppState>) -> Json<Vec<Picture>> {
    Json(state.store.list_pictures().await)
}

async fn get_picture(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Picture>, ApiError> {
    state
        .store
        .get_picture(id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

async fn create_picture(
    State(state): State<AppState>,
    PictureBody(fields): PictureBody,
) -> Result<impl IntoResponse, ApiError> {
    let picture = state.store.add_picture(fields).await?;
    tracing::debug!(id = picture.id, "picture added");

    if let Ok(count) = state.store.count_pictures().await {
        metrics::record_picture_count(count);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Picture added successfully",
            "picture": picture,
        })),
    ))
}

async fn update_picture(Path(id): Path<i64>) -> ApiError {
    tracing::debug!(id, "update requested");
    ApiError::NotImplemented("Updating pictures is not implemented")
}

async fn delete_picture(Path(id): Path<i64>) -> ApiError {
    tracing::debug!(id, "delete requested");
    ApiError::NotImplemented("Deleting pictures is not implemented")
}
