pub mod auth;
pub mod categories;
pub mod genres;
pub mod health;
pub mod titles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     register, mail code (public)
/// /auth/token                                      exchange code for token (public)
///
/// /categories                                      list (public), create (admin)
/// /categories/{slug}                               delete (admin)
/// /genres                                          list (public), create (admin)
/// /genres/{slug}                                   delete (admin)
///
/// /titles                                          list (public), create (admin)
/// /titles/{id}                                     get (public), patch, delete (admin)
/// /titles/{id}/reviews                             list (public), create (auth)
/// /titles/{id}/reviews/{rid}                       get (public), patch, delete (owner/mod/admin)
/// /titles/{id}/reviews/{rid}/comments              list (public), create (auth)
/// /titles/{id}/reviews/{rid}/comments/{cid}        get (public), patch, delete (owner/mod/admin)
///
/// /users                                           list, create (admin)
/// /users/me                                        get, patch (auth)
/// /users/{username}                                get, patch, delete (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/categories", categories::router())
        .nest("/genres", genres::router())
        .nest("/titles", titles::router())
        .nest("/users", users::router())
}
