//! Genre entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::DbId;

/// A row from the `genres` table. Serializes as `{name, slug}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Genre {
    #[serde(skip)]
    pub id: DbId,
    pub name: String,
    pub slug: String,
}

/// DTO for creating a new genre.
#[derive(Debug, Clone)]
pub struct CreateGenre {
    pub name: String,
    pub slug: String,
}
