//! HTTP-level integration tests for categories and genres.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete, delete_auth, get, post_json, post_json_auth, user_token,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_anonymous_can_list_but_not_create(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app.clone(), "/api/v1/categories").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 0);
    assert_eq!(json["results"], json!([]));

    let response = post_json(
        app,
        "/api/v1/categories",
        json!({ "name": "Films", "slug": "films" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_plain_user_and_moderator_cannot_create(pool: PgPool) {
    let user = user_token(&pool, "alice", "user").await;
    let moderator = user_token(&pool, "mod", "moderator").await;
    let app = build_test_app(pool);
    let body = json!({ "name": "Films", "slug": "films" });

    let response = post_json_auth(app.clone(), "/api/v1/categories", body.clone(), &user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app, "/api/v1/categories", body, &moderator).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_creates_category(pool: PgPool) {
    let admin = user_token(&pool, "root", "admin").await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/categories",
        json!({ "name": "Films", "slug": "films" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json, json!({ "name": "Films", "slug": "films" }));

    let json = body_json(get(app, "/api/v1/categories").await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["slug"], "films");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_slug_is_field_error(pool: PgPool) {
    let admin = user_token(&pool, "root", "admin").await;
    let app = build_test_app(pool);
    let body = json!({ "name": "Films", "slug": "films" });

    let first = post_json_auth(app.clone(), "/api/v1/categories", body.clone(), &admin).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_auth(app, "/api/v1/categories", body, &admin).await;
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let json = body_json(second).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["fields"]["slug"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_slug_and_blank_name(pool: PgPool) {
    let admin = user_token(&pool, "root", "admin").await;
    let app = build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/v1/categories",
        json!({ "name": "  ", "slug": "not a slug" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["fields"]["name"].is_array());
    assert!(json["fields"]["slug"].is_array());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_category(pool: PgPool) {
    let admin = user_token(&pool, "root", "admin").await;
    let app = build_test_app(pool);

    post_json_auth(
        app.clone(),
        "/api/v1/categories",
        json!({ "name": "Films", "slug": "films" }),
        &admin,
    )
    .await;

    let response = delete(app.clone(), "/api/v1/categories/films").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = delete_auth(app.clone(), "/api/v1/categories/films", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app, "/api/v1/categories/films", &admin).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_search_and_pagination(pool: PgPool) {
    let admin = user_token(&pool, "root", "admin").await;
    let app = build_test_app(pool);

    for (name, slug) in [("Books", "books"), ("Films", "films"), ("Music", "music")] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/categories",
            json!({ "name": name, "slug": slug }),
            &admin,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let json = body_json(get(app.clone(), "/api/v1/categories?search=fil").await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["name"], "Films");

    let json = body_json(get(app.clone(), "/api/v1/categories?search=_").await).await;
    assert_eq!(json["count"], 0);

    let json = body_json(get(app.clone(), "/api/v1/categories?limit=2").await).await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["results"].as_array().unwrap().len(), 2);

    let json = body_json(get(app, "/api/v1/categories?limit=2&offset=2").await).await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_genre_lifecycle(pool: PgPool) {
    let admin = user_token(&pool, "root", "admin").await;
    let user = user_token(&pool, "alice", "user").await;
    let app = build_test_app(pool);
    let body = json!({ "name": "Drama", "slug": "drama" });

    let response = post_json_auth(app.clone(), "/api/v1/genres", body.clone(), &user).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(app.clone(), "/api/v1/genres", body.clone(), &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app.clone(), "/api/v1/genres", body, &admin).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get(app.clone(), "/api/v1/genres?search=DRA").await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["slug"], "drama");

    let response = delete_auth(app.clone(), "/api/v1/genres/drama", &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app, "/api/v1/genres").await).await;
    assert_eq!(json["count"], 0);
}
