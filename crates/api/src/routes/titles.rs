//! Route definitions for titles and the reviews and comments nested under
//! them.

use axum::routing::get;
use axum::Router;

use crate::handlers::{comments, reviews, titles};
use crate::state::AppState;

/// Routes mounted at `/titles`.
///
/// ```text
/// GET    /                                        -> titles::list
/// POST   /                                        -> titles::create
/// GET    /{id}                                    -> titles::get_by_id
/// PATCH  /{id}                                    -> titles::update
/// DELETE /{id}                                    -> titles::delete
///
/// GET    /{id}/reviews                            -> reviews::list
/// POST   /{id}/reviews                            -> reviews::create
/// GET    /{id}/reviews/{review_id}                -> reviews::get_by_id
/// PATCH  /{id}/reviews/{review_id}                -> reviews::update
/// DELETE /{id}/reviews/{review_id}                -> reviews::delete
///
/// GET    /{id}/reviews/{review_id}/comments       -> comments::list
/// POST   /{id}/reviews/{review_id}/comments       -> comments::create
/// GET    /{id}/reviews/{review_id}/comments/{comment_id} -> comments::get_by_id
/// PATCH  /{id}/reviews/{review_id}/comments/{comment_id} -> comments::update
/// DELETE /{id}/reviews/{review_id}/comments/{comment_id} -> comments::delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(titles::list).post(titles::create))
        .route(
            "/{id}",
            get(titles::get_by_id)
                .patch(titles::update)
                .delete(titles::delete),
        )
        .route(
            "/{id}/reviews",
            get(reviews::list).post(reviews::create),
        )
        .route(
            "/{id}/reviews/{review_id}",
            get(reviews::get_by_id)
                .patch(reviews::update)
                .delete(reviews::delete),
        )
        .route(
            "/{id}/reviews/{review_id}/comments",
            get(comments::list).post(comments::create),
        )
        .route(
            "/{id}/reviews/{review_id}/comments/{comment_id}",
            get(comments::get_by_id)
                .patch(comments::update)
                .delete(comments::delete),
        )
}
