pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::catalogue_routes()
}
