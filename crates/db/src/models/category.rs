//! Category entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `categories` table. Serializes as `{name, slug}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    #[serde(skip)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a new category.
#[derive(Debug, Clone)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
}
