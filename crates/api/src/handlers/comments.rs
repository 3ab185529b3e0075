//! Handlers for `/titles/{title_id}/reviews/{review_id}/comments`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validation::{validate_not_blank, FieldErrors};
use yamdb_db::models::comment::{CommentView, CreateComment, UpdateComment};
use yamdb_db::repositories::CommentRepo;

use super::reviews::{ensure_can_modify, find_review};
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::Page;
use crate::state::AppState;

/// Request body for `POST .../comments`.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub text: String,
}

/// Request body for `PATCH .../comments/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn list(
    State(state): State<AppState>,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;

    let (limit, offset) = params.resolve();
    let results = CommentRepo::list_for_review(&state.pool, review_id, limit, offset).await?;
    let count = CommentRepo::count_for_review(&state.pool, review_id).await?;
    Ok(Json(Page::new(count, results)))
}

/// POST /api/v1/titles/{title_id}/reviews/{review_id}/comments
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<CommentRequest>,
) -> AppResult<impl IntoResponse> {
    find_review(&state.pool, title_id, review_id).await?;

    let mut errors = FieldErrors::new();
    errors.check("text", validate_not_blank(&input.text));
    errors.into_result()?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            review_id,
            author_id: auth.user_id,
            text: input.text,
        },
    )
    .await?;

    tracing::info!(review_id, comment_id = comment.id, user_id = auth.user_id, "Comment created");
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath((title_id, review_id, id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<Json<CommentView>> {
    let comment = find_comment(&state.pool, title_id, review_id, id).await?;
    Ok(Json(comment))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
///
/// Allowed for the author, moderators and administrators.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id, id)): AppPath<(DbId, DbId, DbId)>,
    AppJson(input): AppJson<UpdateCommentRequest>,
) -> AppResult<Json<CommentView>> {
    let comment = find_comment(&state.pool, title_id, review_id, id).await?;
    ensure_can_modify(&auth, comment.author_id)?;

    let mut errors = FieldErrors::new();
    if let Some(ref text) = input.text {
        errors.check("text", validate_not_blank(text));
    }
    errors.into_result()?;

    let updated = CommentRepo::update(&state.pool, review_id, id, &UpdateComment { text: input.text })
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(review_id, comment_id = id, user_id = auth.user_id, "Comment updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{review_id}/comments/{id}
///
/// Allowed for the author, moderators and administrators.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, review_id, id)): AppPath<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let comment = find_comment(&state.pool, title_id, review_id, id).await?;
    ensure_can_modify(&auth, comment.author_id)?;

    if !CommentRepo::delete(&state.pool, review_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(review_id, comment_id = id, user_id = auth.user_id, "Comment deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Comment",
        id,
    })
}

/// Load a comment through its title and review, or 404.
async fn find_comment(
    pool: &PgPool,
    title_id: DbId,
    review_id: DbId,
    id: DbId,
) -> AppResult<CommentView> {
    find_review(pool, title_id, review_id).await?;
    CommentRepo::find(pool, review_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}
