//! Shared query parameter types for API handlers.

use serde::Deserialize;
use yamdb_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` ready to bind.
    pub fn resolve(&self) -> (i64, i64) {
        resolve_page(self.limit, self.offset)
    }
}

/// Pagination plus a free-text `search` term (`?search=&limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    /// The search term, with blank input treated as absent.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn resolve(&self) -> (i64, i64) {
        resolve_page(self.limit, self.offset)
    }
}

/// Clamp raw `limit`/`offset` query values.
pub fn resolve_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        clamp_offset(offset),
    )
}
