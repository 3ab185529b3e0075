//! Handlers for the `/categories` resource.
//!
//! Categories are addressed by slug. Anyone may list them; only catalog
//! editors may create or delete.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use yamdb_core::error::CoreError;
use yamdb_core::validation::{validate_input, validate_not_blank, validate_slug};
use yamdb_db::models::category::CreateCategory;
use yamdb_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireCatalogEditor;
use crate::query::SearchParams;
use crate::response::Page;
use crate::state::AppState;

/// Request body for `POST /categories`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    #[validate(length(max = 256, message = "Ensure this field has no more than 256 characters."))]
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// GET /api/v1/categories?search=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = params.resolve();
    let search = params.term();
    let results = CategoryRepo::list(&state.pool, search, limit, offset).await?;
    let count = CategoryRepo::count(&state.pool, search).await?;
    Ok(Json(Page::new(count, results)))
}

/// POST /api/v1/categories
pub async fn create(
    State(state): State<AppState>,
    RequireCatalogEditor(auth): RequireCatalogEditor,
    AppJson(input): AppJson<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = validate_input(&input);
    errors.check("name", validate_not_blank(&input.name));
    errors.check("slug", validate_slug(&input.slug));
    errors.into_result()?;

    let category = CategoryRepo::create(
        &state.pool,
        &CreateCategory {
            name: input.name,
            slug: input.slug,
        },
    )
    .await?;

    tracing::info!(slug = %category.slug, user_id = auth.user_id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE /api/v1/categories/{slug}
///
/// Titles in the category are kept with no category.
pub async fn delete(
    State(state): State<AppState>,
    RequireCatalogEditor(auth): RequireCatalogEditor,
    AppPath(slug): AppPath<String>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete_by_slug(&state.pool, &slug).await? {
        return Err(AppError::Core(CoreError::NotFoundByKey {
            entity: "Category",
            key: slug,
        }));
    }
    tracing::info!(slug = %slug, user_id = auth.user_id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
