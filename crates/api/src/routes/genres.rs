use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::genres;
use crate::state::AppState;

/// Routes mounted at `/genres`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create
/// DELETE /{slug}  -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(genres::list).post(genres::create))
        .route("/{slug}", delete(genres::delete))
}
