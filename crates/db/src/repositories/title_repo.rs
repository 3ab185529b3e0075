//! Repository for the `titles` and `title_genres` tables.

use std::collections::HashMap;

use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};
use yamdb_core::types::DbId;

use crate::models::genre::Genre;
use crate::models::title::{
    CreateTitle, Title, TitleDetail, TitleGenreRow, TitleListParams, TitleRow, UpdateTitle,
};
use crate::repositories::contains_pattern;

/// Column list for the `titles` table.
const COLUMNS: &str = "id, name, year, description, category_id, created_at, updated_at";

/// Joined read columns: title, its category and the average review score.
const ROW_COLUMNS: &str = "t.id, t.name, t.year, t.description, \
    (SELECT AVG(r.score)::float8 FROM reviews r WHERE r.title_id = t.id) AS rating, \
    c.id AS category_id, c.name AS category_name, c.slug AS category_slug";

/// Provides CRUD operations for titles and their genre links.
pub struct TitleRepo;

impl TitleRepo {
    /// Insert a new title and link its genres in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTitle) -> Result<Title, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO titles (name, year, description, category_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&insert_query)
            .bind(&input.name)
            .bind(input.year)
            .bind(&input.description)
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await?;

        if !input.genre_ids.is_empty() {
            Self::set_genres_inner(&mut tx, title.id, &input.genre_ids).await?;
        }

        tx.commit().await?;
        Ok(title)
    }

    /// Whether a title with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM titles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(exists)
    }

    /// Find a title with its category, genres and rating.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TitleDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {ROW_COLUMNS} \
             FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             WHERE t.id = $1"
        );
        let row = sqlx::query_as::<_, TitleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match row {
            Some(row) => {
                let mut genres = Self::genres_for(pool, &[row.id]).await?;
                let mut reviews = Self::review_ids_for(pool, &[row.id]).await?;
                let genre = genres.remove(&row.id).unwrap_or_default();
                let review_ids = reviews.remove(&row.id).unwrap_or_default();
                Ok(Some(TitleDetail::from_row(row, genre, review_ids)))
            }
            None => Ok(None),
        }
    }

    /// List titles matching `params`, newest first, with nested category,
    /// genres and rating.
    pub async fn list(
        pool: &PgPool,
        params: &TitleListParams,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TitleDetail>, sqlx::Error> {
        let (where_clause, bind_idx) = filter_clause(params);
        let query = format!(
            "SELECT {ROW_COLUMNS} \
             FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             {where_clause} \
             ORDER BY t.id DESC \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );

        let q = bind_filter(sqlx::query_as::<_, TitleRow>(&query), params);
        let rows = q.bind(limit).bind(offset).fetch_all(pool).await?;

        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let mut genres = Self::genres_for(pool, &ids).await?;
        let mut reviews = Self::review_ids_for(pool, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let genre = genres.remove(&row.id).unwrap_or_default();
                let review_ids = reviews.remove(&row.id).unwrap_or_default();
                TitleDetail::from_row(row, genre, review_ids)
            })
            .collect())
    }

    /// Count titles matching the same filter as [`TitleRepo::list`].
    pub async fn count(pool: &PgPool, params: &TitleListParams) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = filter_clause(params);
        let query = format!(
            "SELECT COUNT(*) \
             FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             {where_clause}"
        );
        let (count,) = bind_filter(sqlx::query_as::<_, (i64,)>(&query), params)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Apply a partial update. If `genre_ids` is `Some`, replaces all genre
    /// links in the same transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTitle,
    ) -> Result<Option<Title>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE titles SET \
                name = COALESCE($2, name), \
                year = COALESCE($3, year), \
                description = CASE WHEN $4 THEN $5 ELSE description END, \
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let title = sqlx::query_as::<_, Title>(&update_query)
            .bind(id)
            .bind(&input.name)
            .bind(input.year)
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.category_id.is_some())
            .bind(input.category_id.flatten())
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(ref title) = title {
            if let Some(ref genre_ids) = input.genre_ids {
                Self::set_genres_inner(&mut tx, title.id, genre_ids).await?;
            }
        }

        tx.commit().await?;
        Ok(title)
    }

    /// Delete a title. Its reviews, comments and genre links cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Genre association helpers
    // -----------------------------------------------------------------------

    /// Load the genres of every title in `title_ids`, grouped by title.
    async fn genres_for(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<Genre>>, sqlx::Error> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, TitleGenreRow>(
            "SELECT tg.title_id, g.id, g.name, g.slug \
             FROM title_genres tg \
             JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = ANY($1) \
             ORDER BY g.name",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<DbId, Vec<Genre>> = HashMap::new();
        for row in rows {
            grouped.entry(row.title_id).or_default().push(Genre {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }
        Ok(grouped)
    }

    /// Load the review ids of every title in `title_ids`, grouped by title.
    async fn review_ids_for(
        pool: &PgPool,
        title_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<DbId>>, sqlx::Error> {
        if title_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT title_id, id FROM reviews \
             WHERE title_id = ANY($1) \
             ORDER BY id",
        )
        .bind(title_ids)
        .fetch_all(pool)
        .await?;

        let mut grouped: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (title_id, id) in rows {
            grouped.entry(title_id).or_default().push(id);
        }
        Ok(grouped)
    }

    /// Replace genre links within an existing transaction.
    async fn set_genres_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        title_id: DbId,
        genre_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM title_genres WHERE title_id = $1")
            .bind(title_id)
            .execute(&mut **tx)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                "INSERT INTO title_genres (title_id, genre_id) \
                 SELECT $1, UNNEST($2::bigint[]) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(title_id)
            .bind(genre_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

/// Build the `WHERE` clause for a title filter.
///
/// Returns the clause (possibly empty) and the next free bind index. The
/// placeholders are bound in the same order by [`bind_filter`].
fn filter_clause(params: &TitleListParams) -> (String, u32) {
    let mut conditions = Vec::new();
    let mut bind_idx = 1u32;

    if params.category.is_some() {
        conditions.push(format!("c.slug = ${bind_idx}"));
        bind_idx += 1;
    }
    if params.genre.is_some() {
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM title_genres tg \
             JOIN genres g ON g.id = tg.genre_id \
             WHERE tg.title_id = t.id AND g.slug = ${bind_idx})"
        ));
        bind_idx += 1;
    }
    if params.name.is_some() {
        conditions.push(format!("t.name ILIKE ${bind_idx}"));
        bind_idx += 1;
    }
    if params.year.is_some() {
        conditions.push(format!("t.year = ${bind_idx}"));
        bind_idx += 1;
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (where_clause, bind_idx)
}

/// Bind the filter values in the order [`filter_clause`] numbered them.
fn bind_filter<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    params: &TitleListParams,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    if let Some(ref category) = params.category {
        q = q.bind(category.clone());
    }
    if let Some(ref genre) = params.genre {
        q = q.bind(genre.clone());
    }
    if let Some(ref name) = params.name {
        q = q.bind(contains_pattern(name));
    }
    if let Some(year) = params.year {
        q = q.bind(year);
    }
    q
}
