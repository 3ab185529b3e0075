//! Review entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A review joined with its author's username and its title's name.
///
/// Serializes as `{id, text, author, score, title, pub_date}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewView {
    pub id: DbId,
    #[serde(skip)]
    pub title_id: DbId,
    #[serde(skip)]
    pub author_id: DbId,
    pub text: String,
    /// Author username.
    pub author: String,
    pub score: i32,
    /// Title name.
    pub title: String,
    pub pub_date: Timestamp,
}

/// DTO for creating a new review.
#[derive(Debug, Clone)]
pub struct CreateReview {
    pub title_id: DbId,
    pub author_id: DbId,
    pub text: String,
    pub score: i32,
}

/// DTO for updating an existing review. All fields are optional.
#[derive(Debug, Clone, Default)]
pub struct UpdateReview {
    pub text: Option<String>,
    pub score: Option<i32>,
}
