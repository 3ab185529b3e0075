//! Repository for the `comments` table.

use sqlx::PgPool;
use yamdb_core::types::DbId;

use crate::models::comment::{CommentView, CreateComment, UpdateComment};

const VIEW_COLUMNS: &str = "c.id, c.review_id, c.author_id, c.text, u.username AS author, c.pub_date";

/// Provides CRUD operations for comments, scoped to their review.
///
/// Callers resolve the review through its title first (see
/// [`ReviewRepo::find`](super::ReviewRepo::find)), so a comment reached via
/// the wrong title is never found.
pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(pool: &PgPool, input: &CreateComment) -> Result<CommentView, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO comments (review_id, author_id, text)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT {VIEW_COLUMNS}
             FROM c
             JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, CommentView>(&query)
            .bind(input.review_id)
            .bind(input.author_id)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by id, only if it belongs to `review_id`.
    pub async fn find(
        pool: &PgPool,
        review_id: DbId,
        id: DbId,
    ) -> Result<Option<CommentView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1 AND c.id = $2"
        );
        sqlx::query_as::<_, CommentView>(&query)
            .bind(review_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the comments of a review, oldest first.
    pub async fn list_for_review(
        pool: &PgPool,
        review_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentView>, sqlx::Error> {
        let query = format!(
            "SELECT {VIEW_COLUMNS}
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.review_id = $1
             ORDER BY c.pub_date, c.id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, CommentView>(&query)
            .bind(review_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_review(pool: &PgPool, review_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM comments WHERE review_id = $1")
                .bind(review_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Returns `None` if the comment does not exist under `review_id`.
    pub async fn update(
        pool: &PgPool,
        review_id: DbId,
        id: DbId,
        input: &UpdateComment,
    ) -> Result<Option<CommentView>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                UPDATE comments SET text = COALESCE($3, text)
                WHERE review_id = $1 AND id = $2
                RETURNING *
             )
             SELECT {VIEW_COLUMNS}
             FROM c
             JOIN users u ON u.id = c.author_id"
        );
        sqlx::query_as::<_, CommentView>(&query)
            .bind(review_id)
            .bind(id)
            .bind(&input.text)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, review_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE review_id = $1 AND id = $2")
            .bind(review_id)
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
