//! Title entity model, read views and DTOs.
//!
//! A title belongs to at most one category and to any number of genres via
//! the `title_genres` junction table. Its rating is the average score of its
//! reviews and is computed at read time.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

use super::category::Category;
use super::genre::Genre;

/// A row from the `titles` table.
#[derive(Debug, Clone, FromRow)]
pub struct Title {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Title row joined with its category and aggregated rating.
#[derive(Debug, Clone, FromRow)]
pub struct TitleRow {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
}

/// A genre linked to a specific title (used to batch-load genres).
#[derive(Debug, Clone, FromRow)]
pub struct TitleGenreRow {
    pub title_id: DbId,
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// Read representation of a title with nested category and genres.
#[derive(Debug, Clone, Serialize)]
pub struct TitleDetail {
    pub id: DbId,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub genre: Vec<Genre>,
    /// Ids of the title's reviews, oldest first.
    pub reviews: Vec<DbId>,
}

impl TitleDetail {
    /// Assemble a detail view from a joined row, its genres and review ids.
    pub fn from_row(row: TitleRow, genre: Vec<Genre>, reviews: Vec<DbId>) -> Self {
        let category = match (row.category_id, row.category_name, row.category_slug) {
            (Some(id), Some(name), Some(slug)) => Some(Category { id, name, slug }),
            _ => None,
        };
        Self {
            id: row.id,
            name: row.name,
            year: row.year,
            rating: row.rating,
            description: row.description,
            category,
            genre,
            reviews,
        }
    }
}

/// Query parameters for `GET /titles`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleListParams {
    /// Category slug.
    pub category: Option<String>,
    /// Genre slug.
    pub genre: Option<String>,
    /// Case-insensitive substring of the title name.
    pub name: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// DTO for creating a new title. Category and genres are already resolved
/// from slugs to ids.
#[derive(Debug, Clone)]
pub struct CreateTitle {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub genre_ids: Vec<DbId>,
}

/// DTO for a partial title update.
///
/// The nested `Option`s on nullable columns distinguish "leave unchanged"
/// (`None`) from "set to NULL" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct UpdateTitle {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<DbId>>,
    /// If `Some`, replaces all genre links.
    pub genre_ids: Option<Vec<DbId>>,
}
