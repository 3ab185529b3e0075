//! Repository layer: one zero-sized struct per table with async associated
//! functions taking a `&PgPool`.

pub mod category_repo;
pub mod comment_repo;
pub mod genre_repo;
pub mod review_repo;
pub mod title_repo;
pub mod user_repo;

pub use category_repo::CategoryRepo;
pub use comment_repo::CommentRepo;
pub use genre_repo::GenreRepo;
pub use review_repo::ReviewRepo;
pub use title_repo::TitleRepo;
pub use user_repo::UserRepo;

/// `ILIKE` pattern matching `term` as a literal substring.
///
/// `\`, `%` and `_` are escaped with Postgres' default `LIKE` escape
/// character so they match themselves.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
