use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::{Collection, Document},
};

/// Product field matched by the brand filter.
const BRAND_FIELD: &str = "brands";

pub fn catalogue_routes() -> Router<AppState> {
    Router::new()
        .route("/flash-sale", get(list_flash_sale))
        .route("/all-products", get(list_products))
        .route("/all-products/:id", get(get_product))
        .route("/all-products/brand/:brand", get(list_products_by_brand))
}

#[instrument(skip(state))]
pub async fn list_flash_sale(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let items = state.store.find_all(Collection::FlashSale).await?;
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let products = state.store.find_all(Collection::Products).await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Document>> {
    let id = Uuid::parse_str(&id).map_err(|_| AppError::MalformedIdentifier(id))?;
    state
        .store
        .find_by_id(Collection::Products, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound("Product"))
}

#[instrument(skip(state))]
pub async fn list_products_by_brand(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> AppResult<Json<Vec<Document>>> {
    let products = state
        .store
        .find_by_field_ignore_case(Collection::Products, BRAND_FIELD, brand.trim())
        .await?;
    debug!(%brand, count = products.len(), "brand filter");
    Ok(Json(products))
}
