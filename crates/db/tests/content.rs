//! Integration tests for reviews and comments:
//! - one review per (author, title)
//! - score range enforced by the schema
//! - title-scoped lookups
//! - cascades from titles, reviews and users

use assert_matches::assert_matches;
use sqlx::PgPool;
use yamdb_db::models::comment::{CreateComment, UpdateComment};
use yamdb_db::models::review::{CreateReview, UpdateReview};
use yamdb_db::models::title::CreateTitle;
use yamdb_db::models::user::{CreateUser, User};
use yamdb_db::repositories::{CommentRepo, ReviewRepo, TitleRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user(pool: &PgPool, name: &str) -> User {
    UserRepo::create(pool, &CreateUser::signup(name, &format!("{name}@example.com")))
        .await
        .unwrap()
}

async fn seed_title(pool: &PgPool, name: &str) -> i64 {
    TitleRepo::create(
        pool,
        &CreateTitle {
            name: name.to_string(),
            year: 2000,
            description: None,
            category_id: None,
            genre_ids: vec![],
        },
    )
    .await
    .unwrap()
    .id
}

fn new_review(title_id: i64, author_id: i64, score: i32) -> CreateReview {
    CreateReview {
        title_id,
        author_id,
        text: "Worth watching".to_string(),
        score,
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_review_create_returns_names(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let title_id = seed_title(&pool, "Heat").await;

    let review = ReviewRepo::create(&pool, &new_review(title_id, alice.id, 9))
        .await
        .unwrap();
    assert_eq!(review.author, "alice");
    assert_eq!(review.title, "Heat");
    assert_eq!(review.score, 9);

    assert!(ReviewRepo::exists_for_author(&pool, title_id, alice.id).await.unwrap());
    assert_eq!(ReviewRepo::count_for_title(&pool, title_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_review_for_same_title_violates_constraint(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let title_id = seed_title(&pool, "Heat").await;

    ReviewRepo::create(&pool, &new_review(title_id, alice.id, 9))
        .await
        .unwrap();
    let err = ReviewRepo::create(&pool, &new_review(title_id, alice.id, 3))
        .await
        .unwrap_err();

    let constraint = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    };
    assert_eq!(constraint.as_deref(), Some("uq_reviews_author_title"));
    assert_eq!(ReviewRepo::count_for_title(&pool, title_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_score_out_of_range_is_rejected(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let title_id = seed_title(&pool, "Heat").await;

    for score in [11, 0] {
        let err = ReviewRepo::create(&pool, &new_review(title_id, alice.id, score))
            .await
            .unwrap_err();
        assert_matches!(err, sqlx::Error::Database(_));
    }
    assert_eq!(ReviewRepo::count_for_title(&pool, title_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_lookup_is_scoped_to_title(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let heat = seed_title(&pool, "Heat").await;
    let ronin = seed_title(&pool, "Ronin").await;

    let review = ReviewRepo::create(&pool, &new_review(heat, alice.id, 8))
        .await
        .unwrap();

    assert!(ReviewRepo::find(&pool, heat, review.id).await.unwrap().is_some());
    assert!(ReviewRepo::find(&pool, ronin, review.id).await.unwrap().is_none());
    assert!(!ReviewRepo::delete(&pool, ronin, review.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_review_update_keeps_unset_fields(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let title_id = seed_title(&pool, "Heat").await;
    let review = ReviewRepo::create(&pool, &new_review(title_id, alice.id, 8))
        .await
        .unwrap();

    let updated = ReviewRepo::update(
        &pool,
        title_id,
        review.id,
        &UpdateReview {
            score: Some(4),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.score, 4);
    assert_eq!(updated.text, review.text);
    assert_eq!(updated.pub_date, review.pub_date);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reviews_listed_newest_first(pool: PgPool) {
    let title_id = seed_title(&pool, "Heat").await;
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;

    ReviewRepo::create(&pool, &new_review(title_id, alice.id, 5))
        .await
        .unwrap();
    ReviewRepo::create(&pool, &new_review(title_id, bob.id, 6))
        .await
        .unwrap();

    let reviews = ReviewRepo::list_for_title(&pool, title_id, 10, 0).await.unwrap();
    let authors: Vec<_> = reviews.iter().map(|r| r.author.as_str()).collect();
    assert_eq!(authors, ["bob", "alice"]);
}

// ---------------------------------------------------------------------------
// Comments and cascades
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_comment_crud(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let title_id = seed_title(&pool, "Heat").await;
    let review = ReviewRepo::create(&pool, &new_review(title_id, alice.id, 8))
        .await
        .unwrap();

    let comment = CommentRepo::create(
        &pool,
        &CreateComment {
            review_id: review.id,
            author_id: bob.id,
            text: "Agreed".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(comment.author, "bob");

    let updated = CommentRepo::update(
        &pool,
        review.id,
        comment.id,
        &UpdateComment {
            text: Some("Strongly agreed".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.text, "Strongly agreed");

    assert_eq!(CommentRepo::count_for_review(&pool, review.id).await.unwrap(), 1);
    let listed = CommentRepo::list_for_review(&pool, review.id, 10, 0).await.unwrap();
    assert_eq!(listed[0].id, comment.id);

    assert!(CommentRepo::delete(&pool, review.id, comment.id).await.unwrap());
    assert!(CommentRepo::find(&pool, review.id, comment.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_title_delete_cascades_to_reviews_and_comments(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let title_id = seed_title(&pool, "Heat").await;
    let review = ReviewRepo::create(&pool, &new_review(title_id, alice.id, 8))
        .await
        .unwrap();
    CommentRepo::create(
        &pool,
        &CreateComment {
            review_id: review.id,
            author_id: alice.id,
            text: "Self-reply".to_string(),
        },
    )
    .await
    .unwrap();

    TitleRepo::delete(&pool, title_id).await.unwrap();

    let (reviews,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (comments,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((reviews, comments), (0, 0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_delete_cascades_to_own_content(pool: PgPool) {
    let alice = seed_user(&pool, "alice").await;
    let bob = seed_user(&pool, "bob").await;
    let title_id = seed_title(&pool, "Heat").await;

    ReviewRepo::create(&pool, &new_review(title_id, alice.id, 8))
        .await
        .unwrap();
    ReviewRepo::create(&pool, &new_review(title_id, bob.id, 2))
        .await
        .unwrap();

    assert!(UserRepo::delete_by_username(&pool, "alice").await.unwrap());

    let reviews = ReviewRepo::list_for_title(&pool, title_id, 10, 0).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].author, "bob");
}
