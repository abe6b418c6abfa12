//! Item routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use inventory_core::ItemFields;
use inventory_db::Item;

use crate::error::ApiError;
use crate::extract::{ItemId, Payload};
use crate::state::AppState;

use super::auth::RequireAuth;

/// GET /api/items/
async fn list_items(
    _user: RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>, ApiError> {
    Ok(Json(state.items.list_items().await?))
}

/// POST /api/items/
async fn create_item(
    _user: RequireAuth,
    State(state): State<AppState>,
    Payload(fields): Payload<ItemFields>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let item = state.items.create_item(&fields).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/items/{id}/
async fn get_item(
    _user: RequireAuth,
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> Result<Json<Item>, ApiError> {
    Ok(Json(state.items.get_item(id).await?))
}

/// PUT /api/items/{id}/
async fn update_item(
    _user: RequireAuth,
    State(state): State<AppState>,
    ItemId(id): ItemId,
    Payload(fields): Payload<ItemFields>,
) -> Result<Json<Item>, ApiError> {
    Ok(Json(state.items.update_item(id, &fields).await?))
}

/// PATCH /api/items/{id}/
async fn patch_item(
    _user: RequireAuth,
    State(state): State<AppState>,
    ItemId(id): ItemId,
    Payload(fields): Payload<ItemFields>,
) -> Result<Json<Item>, ApiError> {
    Ok(Json(state.items.patch_item(id, &fields).await?))
}

/// DELETE /api/items/{id}/
async fn delete_item(
    _user: RequireAuth,
    State(state): State<AppState>,
    ItemId(id): ItemId,
) -> Result<StatusCode, ApiError> {
    state.items.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create item routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/items/", get(list_items).post(create_item))
        .route(
            "/api/items/{id}/",
            get(get_item)
                .put(update_item)
                .patch(patch_item)
                .delete(delete_item),
        )
}
