use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    storage::{Collection, Document, InsertOneResult},
};

pub fn reverie_routes() -> Router<AppState> {
    Router::new()
        .route("/reverie", get(list_reverie))
        .route("/create-reverie", post(create_reverie))
}

#[instrument(skip(state))]
pub async fn list_reverie(State(state): State<AppState>) -> AppResult<Json<Vec<Document>>> {
    let entries = state.store.find_all(Collection::Reverie).await?;
    Ok(Json(entries))
}

/// Stores the body as-is. Only the top-level shape is checked.
#[instrument(skip(state, body))]
pub async fn create_reverie(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<InsertOneResult>> {
    let Json(body) = body?;
    let Value::Object(entry) = body else {
        return Err(AppError::validation("reverie entry must be a JSON object"));
    };
    debug!(?entry, "creating reverie entry");
    let result = state.store.insert_one(Collection::Reverie, entry).await?;
    debug!(inserted_id = %result.inserted_id, "reverie entry created");
    Ok(Json(result))
}
