//! Handlers for `/titles/{title_id}/reviews`.
//!
//! Every operation resolves the review through its title, so a review id
//! paired with the wrong title is a 404.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use sqlx::PgPool;
use yamdb_core::error::CoreError;
use yamdb_core::permissions::can_modify_content;
use yamdb_core::types::DbId;
use yamdb_core::validation::{required, validate_not_blank, validate_score, FieldErrors};
use yamdb_db::models::review::{CreateReview, ReviewView, UpdateReview};
use yamdb_db::repositories::{ReviewRepo, TitleRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::Page;
use crate::state::AppState;

/// Request body for `POST /titles/{title_id}/reviews`.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    #[serde(default)]
    pub text: String,
    pub score: Option<i32>,
}

/// Request body for `PATCH /titles/{title_id}/reviews/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub text: Option<String>,
    pub score: Option<i32>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles/{title_id}/reviews
pub async fn list(
    State(state): State<AppState>,
    AppPath(title_id): AppPath<DbId>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    ensure_title_exists(&state.pool, title_id).await?;

    let (limit, offset) = params.resolve();
    let results = ReviewRepo::list_for_title(&state.pool, title_id, limit, offset).await?;
    let count = ReviewRepo::count_for_title(&state.pool, title_id).await?;
    Ok(Json(Page::new(count, results)))
}

/// POST /api/v1/titles/{title_id}/reviews
///
/// Each user may review a title once.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath(title_id): AppPath<DbId>,
    AppJson(input): AppJson<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    ensure_title_exists(&state.pool, title_id).await?;

    let mut errors = FieldErrors::new();
    errors.check("text", validate_not_blank(&input.text));
    let score = errors.require("score", input.score);
    if let Some(score) = score {
        errors.check("score", validate_score(score));
    }
    errors.into_result()?;
    let score = required("score", score)?;

    if ReviewRepo::exists_for_author(&state.pool, title_id, auth.user_id).await? {
        return Err(CoreError::InvalidFields(FieldErrors::single(
            FieldErrors::NON_FIELD,
            "You have already reviewed this title.",
        ))
        .into());
    }

    let review = ReviewRepo::create(
        &state.pool,
        &CreateReview {
            title_id,
            author_id: auth.user_id,
            text: input.text,
            score,
        },
    )
    .await?;

    tracing::info!(title_id, review_id = review.id, user_id = auth.user_id, "Review created");
    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/v1/titles/{title_id}/reviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath((title_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<Json<ReviewView>> {
    let review = find_review(&state.pool, title_id, id).await?;
    Ok(Json(review))
}

/// PATCH /api/v1/titles/{title_id}/reviews/{id}
///
/// Allowed for the author, moderators and administrators.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, id)): AppPath<(DbId, DbId)>,
    AppJson(input): AppJson<UpdateReviewRequest>,
) -> AppResult<Json<ReviewView>> {
    let review = find_review(&state.pool, title_id, id).await?;
    ensure_can_modify(&auth, review.author_id)?;

    let mut errors = FieldErrors::new();
    if let Some(ref text) = input.text {
        errors.check("text", validate_not_blank(text));
    }
    if let Some(score) = input.score {
        errors.check("score", validate_score(score));
    }
    errors.into_result()?;

    let updated = ReviewRepo::update(
        &state.pool,
        title_id,
        id,
        &UpdateReview {
            text: input.text,
            score: input.score,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    tracing::info!(title_id, review_id = id, user_id = auth.user_id, "Review updated");
    Ok(Json(updated))
}

/// DELETE /api/v1/titles/{title_id}/reviews/{id}
///
/// Allowed for the author, moderators and administrators. Comments are
/// deleted with the review.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    AppPath((title_id, id)): AppPath<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    let review = find_review(&state.pool, title_id, id).await?;
    ensure_can_modify(&auth, review.author_id)?;

    if !ReviewRepo::delete(&state.pool, title_id, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(title_id, review_id = id, user_id = auth.user_id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Review",
        id,
    })
}

async fn ensure_title_exists(pool: &PgPool, title_id: DbId) -> AppResult<()> {
    if TitleRepo::exists(pool, title_id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Title",
            id: title_id,
        }))
    }
}

/// Load a review under its title, or 404.
pub(crate) async fn find_review(pool: &PgPool, title_id: DbId, id: DbId) -> AppResult<ReviewView> {
    ReviewRepo::find(pool, title_id, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Reject with 403 unless `auth` may edit content written by `author_id`.
pub(crate) fn ensure_can_modify(auth: &AuthUser, author_id: DbId) -> AppResult<()> {
    if can_modify_content(&auth.role, auth.user_id, author_id) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the author, a moderator or an administrator may change this".into(),
        )))
    }
}
