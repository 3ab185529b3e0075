//! Comment entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use yamdb_core::types::{DbId, Timestamp};

/// A comment joined with its author's username.
///
/// Serializes as `{id, text, author, pub_date}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentView {
    pub id: DbId,
    #[serde(skip)]
    pub review_id: DbId,
    #[serde(skip)]
    pub author_id: DbId,
    pub text: String,
    pub author: String,
    pub pub_date: Timestamp,
}

/// DTO for creating a new comment.
#[derive(Debug, Clone)]
pub struct CreateComment {
    pub review_id: DbId,
    pub author_id: DbId,
    pub text: String,
}

/// DTO for updating an existing comment.
#[derive(Debug, Clone, Default)]
pub struct UpdateComment {
    pub text: Option<String>,
}
