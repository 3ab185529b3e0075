//! Handlers for the `/titles` resource.
//!
//! Reads return [`TitleDetail`] with nested category, genres, rating and review ids.
//! Writes accept and return category and genres by slug.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use yamdb_core::error::CoreError;
use yamdb_core::types::DbId;
use yamdb_core::validation::{required, validate_not_blank, validate_year, FieldErrors};
use yamdb_db::models::title::{CreateTitle, TitleDetail, TitleListParams, UpdateTitle};
use yamdb_db::repositories::{CategoryRepo, GenreRepo, TitleRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireCatalogEditor;
use crate::query::resolve_page;
use crate::response::Page;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /titles`.
#[derive(Debug, Deserialize)]
pub struct CreateTitleRequest {
    #[serde(default)]
    pub name: String,
    pub year: Option<i32>,
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Genre slugs.
    #[serde(default)]
    pub genre: Vec<String>,
}

/// Request body for `PATCH /titles/{id}`. Absent fields are left unchanged;
/// an explicit `null` clears `description` or `category`.
#[derive(Debug, Deserialize)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub genre: Option<Vec<String>>,
}

/// Write representation: category and genres as slugs.
#[derive(Debug, Serialize)]
pub struct TitleWriteResponse {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Vec<String>,
}

impl From<TitleDetail> for TitleWriteResponse {
    fn from(detail: TitleDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name,
            year: detail.year,
            description: detail.description,
            category: detail.category.map(|c| c.slug),
            genre: detail.genre.into_iter().map(|g| g.slug).collect(),
        }
    }
}

/// Distinguish a missing field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/titles?category=&genre=&name=&year=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TitleListParams>,
) -> AppResult<impl IntoResponse> {
    let (limit, offset) = resolve_page(params.limit, params.offset);
    let results = TitleRepo::list(&state.pool, &params, limit, offset).await?;
    let count = TitleRepo::count(&state.pool, &params).await?;
    Ok(Json(Page::new(count, results)))
}

/// GET /api/v1/titles/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<TitleDetail>> {
    let title = find_title(&state.pool, id).await?;
    Ok(Json(title))
}

/// POST /api/v1/titles
pub async fn create(
    State(state): State<AppState>,
    RequireCatalogEditor(auth): RequireCatalogEditor,
    AppJson(input): AppJson<CreateTitleRequest>,
) -> AppResult<impl IntoResponse> {
    let mut errors = FieldErrors::new();
    errors.check("name", validate_not_blank(&input.name));
    let year = errors.require("year", input.year);
    if let Some(year) = year {
        errors.check("year", validate_year(year));
    }

    let category_id = match input.category.as_deref() {
        Some(slug) => resolve_category(&state.pool, slug, &mut errors).await?,
        None => None,
    };
    let genre_ids = resolve_genres(&state.pool, &input.genre, &mut errors).await?;
    errors.into_result()?;
    let year = required("year", year)?;

    let title = TitleRepo::create(
        &state.pool,
        &CreateTitle {
            name: input.name,
            year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?;

    tracing::info!(title_id = title.id, user_id = auth.user_id, "Title created");

    let detail = find_title(&state.pool, title.id).await?;
    Ok((StatusCode::CREATED, Json(TitleWriteResponse::from(detail))))
}

/// PATCH /api/v1/titles/{id}
///
/// Partial update. If `genre` is present, replaces all genre links.
pub async fn update(
    State(state): State<AppState>,
    RequireCatalogEditor(auth): RequireCatalogEditor,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateTitleRequest>,
) -> AppResult<Json<TitleWriteResponse>> {
    if !TitleRepo::exists(&state.pool, id).await? {
        return Err(not_found(id));
    }

    let mut errors = FieldErrors::new();
    if let Some(ref name) = input.name {
        errors.check("name", validate_not_blank(name));
    }
    if let Some(year) = input.year {
        errors.check("year", validate_year(year));
    }

    let category_id = match input.category {
        Some(Some(ref slug)) => Some(resolve_category(&state.pool, slug, &mut errors).await?),
        Some(None) => Some(None),
        None => None,
    };
    let genre_ids = match input.genre {
        Some(ref slugs) => Some(resolve_genres(&state.pool, slugs, &mut errors).await?),
        None => None,
    };
    errors.into_result()?;

    TitleRepo::update(
        &state.pool,
        id,
        &UpdateTitle {
            name: input.name,
            year: input.year,
            description: input.description,
            category_id,
            genre_ids,
        },
    )
    .await?
    .ok_or_else(|| not_found(id))?;

    tracing::info!(title_id = id, user_id = auth.user_id, "Title updated");

    let detail = find_title(&state.pool, id).await?;
    Ok(Json(TitleWriteResponse::from(detail)))
}

/// DELETE /api/v1/titles/{id}
///
/// Reviews and their comments are deleted with the title.
pub async fn delete(
    State(state): State<AppState>,
    RequireCatalogEditor(auth): RequireCatalogEditor,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if !TitleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    tracing::info!(title_id = id, user_id = auth.user_id, "Title deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Title", id })
}

async fn find_title(pool: &PgPool, id: DbId) -> AppResult<TitleDetail> {
    TitleRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Look up a category by slug, recording a `category` field error when it
/// does not exist.
async fn resolve_category(
    pool: &PgPool,
    slug: &str,
    errors: &mut FieldErrors,
) -> AppResult<Option<DbId>> {
    match CategoryRepo::find_by_slug(pool, slug).await? {
        Some(category) => Ok(Some(category.id)),
        None => {
            errors.add("category", format!("Object with slug={slug} does not exist."));
            Ok(None)
        }
    }
}

/// Look up genres by slug, recording a `genre` field error for each unknown
/// slug.
async fn resolve_genres(
    pool: &PgPool,
    slugs: &[String],
    errors: &mut FieldErrors,
) -> AppResult<Vec<DbId>> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let genres = GenreRepo::find_by_slugs(pool, slugs).await?;
    for slug in slugs {
        if !genres.iter().any(|g| &g.slug == slug) {
            errors.add("genre", format!("Object with slug={slug} does not exist."));
        }
    }
    Ok(genres.into_iter().map(|g| g.id).collect())
}
