//! Integration tests for categories, genres and titles against a real
//! database:
//! - slug uniqueness constraints
//! - title creation with genre links, filters and counts
//! - set-null on category delete, cascade on genre delete
//! - computed rating

use sqlx::PgPool;
use yamdb_db::models::category::CreateCategory;
use yamdb_db::models::genre::CreateGenre;
use yamdb_db::models::review::CreateReview;
use yamdb_db::models::title::{CreateTitle, TitleListParams, UpdateTitle};
use yamdb_db::models::user::CreateUser;
use yamdb_db::repositories::{CategoryRepo, GenreRepo, ReviewRepo, TitleRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_title(name: &str, year: i32, category_id: Option<i64>, genre_ids: Vec<i64>) -> CreateTitle {
    CreateTitle {
        name: name.to_string(),
        year,
        description: None,
        category_id,
        genre_ids,
    }
}

async fn seed_category(pool: &PgPool, name: &str, slug: &str) -> i64 {
    CategoryRepo::create(
        pool,
        &CreateCategory {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_genre(pool: &PgPool, name: &str, slug: &str) -> i64 {
    GenreRepo::create(
        pool,
        &CreateGenre {
            name: name.to_string(),
            slug: slug.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn constraint_of(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Categories and genres
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_category_slug_is_unique(pool: PgPool) {
    seed_category(&pool, "Films", "films").await;

    let err = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: "Movies".to_string(),
            slug: "films".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(constraint_of(&err).as_deref(), Some("uq_categories_slug"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_category_search_and_count(pool: PgPool) {
    seed_category(&pool, "Films", "films").await;
    seed_category(&pool, "Books", "books").await;
    seed_category(&pool, "Music", "music").await;

    let all = CategoryRepo::list(&pool, None, 10, 0).await.unwrap();
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Books", "Films", "Music"]);
    assert_eq!(CategoryRepo::count(&pool, None).await.unwrap(), 3);

    let found = CategoryRepo::list(&pool, Some("fIl"), 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].slug, "films");
    assert_eq!(CategoryRepo::count(&pool, Some("fIl")).await.unwrap(), 1);

    let page = CategoryRepo::list(&pool, None, 1, 1).await.unwrap();
    assert_eq!(page[0].name, "Films");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_treats_wildcards_literally(pool: PgPool) {
    seed_category(&pool, "Films", "films").await;
    seed_category(&pool, "Books", "books").await;
    seed_category(&pool, "100% Docs", "docs").await;
    seed_genre(&pool, "Sci_Fi", "sci-fi").await;
    seed_genre(&pool, "Drama", "drama").await;

    assert_eq!(CategoryRepo::count(&pool, Some("_")).await.unwrap(), 0);
    assert_eq!(CategoryRepo::count(&pool, Some("%")).await.unwrap(), 1);
    let found = CategoryRepo::list(&pool, Some("0%"), 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].slug, "docs");

    assert_eq!(GenreRepo::count(&pool, Some("_")).await.unwrap(), 1);
    assert_eq!(GenreRepo::count(&pool, Some("i_f")).await.unwrap(), 1);
    assert_eq!(GenreRepo::count(&pool, Some("r_m")).await.unwrap(), 0);

    TitleRepo::create(&pool, &new_title("Heat", 1995, None, vec![]))
        .await
        .unwrap();
    let params = TitleListParams {
        name: Some("%".into()),
        ..Default::default()
    };
    assert_eq!(TitleRepo::count(&pool, &params).await.unwrap(), 0);
    let params = TitleListParams {
        name: Some("H_at".into()),
        ..Default::default()
    };
    assert_eq!(TitleRepo::count(&pool, &params).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_genre_find_by_slugs_skips_unknown(pool: PgPool) {
    seed_genre(&pool, "Drama", "drama").await;
    seed_genre(&pool, "Comedy", "comedy").await;

    let slugs = vec!["drama".to_string(), "horror".to_string()];
    let found = GenreRepo::find_by_slugs(&pool, &slugs).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].slug, "drama");
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_title_create_with_genres(pool: PgPool) {
    let films = seed_category(&pool, "Films", "films").await;
    let drama = seed_genre(&pool, "Drama", "drama").await;
    let comedy = seed_genre(&pool, "Comedy", "comedy").await;

    let title = TitleRepo::create(&pool, &new_title("Amelie", 2001, Some(films), vec![drama, comedy]))
        .await
        .unwrap();

    let detail = TitleRepo::find_by_id(&pool, title.id).await.unwrap().unwrap();
    assert_eq!(detail.name, "Amelie");
    assert_eq!(detail.category.as_ref().map(|c| c.slug.as_str()), Some("films"));
    let genres: Vec<_> = detail.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(genres, ["comedy", "drama"]);
    assert!(detail.rating.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_title_filters(pool: PgPool) {
    let films = seed_category(&pool, "Films", "films").await;
    let books = seed_category(&pool, "Books", "books").await;
    let drama = seed_genre(&pool, "Drama", "drama").await;

    TitleRepo::create(&pool, &new_title("The Ring", 2002, Some(films), vec![drama]))
        .await
        .unwrap();
    TitleRepo::create(&pool, &new_title("Lord of the Rings", 1954, Some(books), vec![]))
        .await
        .unwrap();
    TitleRepo::create(&pool, &new_title("Heat", 1995, Some(films), vec![]))
        .await
        .unwrap();

    let by_name = TitleListParams {
        name: Some("RING".into()),
        ..Default::default()
    };
    assert_eq!(TitleRepo::count(&pool, &by_name).await.unwrap(), 2);

    let by_category = TitleListParams {
        category: Some("films".into()),
        ..Default::default()
    };
    let films_list = TitleRepo::list(&pool, &by_category, 10, 0).await.unwrap();
    assert_eq!(films_list.len(), 2);

    let combined = TitleListParams {
        category: Some("films".into()),
        genre: Some("drama".into()),
        year: Some(2002),
        ..Default::default()
    };
    let found = TitleRepo::list(&pool, &combined, 10, 0).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "The Ring");
    assert_eq!(found[0].genre.len(), 1);

    let none = TitleListParams {
        year: Some(1800),
        ..Default::default()
    };
    assert!(TitleRepo::list(&pool, &none, 10, 0).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_title_update_replaces_genres_and_clears_category(pool: PgPool) {
    let films = seed_category(&pool, "Films", "films").await;
    let drama = seed_genre(&pool, "Drama", "drama").await;
    let comedy = seed_genre(&pool, "Comedy", "comedy").await;

    let title = TitleRepo::create(&pool, &new_title("Heat", 1995, Some(films), vec![drama]))
        .await
        .unwrap();

    let updated = TitleRepo::update(
        &pool,
        title.id,
        &UpdateTitle {
            year: Some(1996),
            category_id: Some(None),
            genre_ids: Some(vec![comedy]),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.year, 1996);
    assert_eq!(updated.name, "Heat");
    assert!(updated.category_id.is_none());

    let detail = TitleRepo::find_by_id(&pool, title.id).await.unwrap().unwrap();
    let genres: Vec<_> = detail.genre.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(genres, ["comedy"]);

    let missing = TitleRepo::update(&pool, 999_999, &UpdateTitle::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_category_delete_sets_title_category_null(pool: PgPool) {
    let films = seed_category(&pool, "Films", "films").await;
    let title = TitleRepo::create(&pool, &new_title("Heat", 1995, Some(films), vec![]))
        .await
        .unwrap();

    assert!(CategoryRepo::delete_by_slug(&pool, "films").await.unwrap());
    assert!(!CategoryRepo::delete_by_slug(&pool, "films").await.unwrap());

    let detail = TitleRepo::find_by_id(&pool, title.id).await.unwrap().unwrap();
    assert!(detail.category.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_genre_delete_cascades_links_only(pool: PgPool) {
    let drama = seed_genre(&pool, "Drama", "drama").await;
    let title = TitleRepo::create(&pool, &new_title("Heat", 1995, None, vec![drama]))
        .await
        .unwrap();

    assert!(GenreRepo::delete_by_slug(&pool, "drama").await.unwrap());

    let detail = TitleRepo::find_by_id(&pool, title.id).await.unwrap().unwrap();
    assert!(detail.genre.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_title_rating_is_average_score(pool: PgPool) {
    let title = TitleRepo::create(&pool, &new_title("Heat", 1995, None, vec![]))
        .await
        .unwrap();

    let mut review_ids = Vec::new();
    for (name, score) in [("alice", 10), ("bob", 7)] {
        let user = UserRepo::create(&pool, &CreateUser::signup(name, &format!("{name}@example.com")))
            .await
            .unwrap();
        let review = ReviewRepo::create(
            &pool,
            &CreateReview {
                title_id: title.id,
                author_id: user.id,
                text: "Good".to_string(),
                score,
            },
        )
        .await
        .unwrap();
        review_ids.push(review.id);
    }

    let detail = TitleRepo::find_by_id(&pool, title.id).await.unwrap().unwrap();
    assert_eq!(detail.rating, Some(8.5));
    assert_eq!(detail.reviews, review_ids);

    let listed = TitleRepo::list(&pool, &TitleListParams::default(), 10, 0).await.unwrap();
    assert_eq!(listed[0].reviews, review_ids);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_title_delete_and_exists(pool: PgPool) {
    let title = TitleRepo::create(&pool, &new_title("Heat", 1995, None, vec![]))
        .await
        .unwrap();
    assert!(TitleRepo::exists(&pool, title.id).await.unwrap());

    assert!(TitleRepo::delete(&pool, title.id).await.unwrap());
    assert!(!TitleRepo::exists(&pool, title.id).await.unwrap());
    assert!(TitleRepo::find_by_id(&pool, title.id).await.unwrap().is_none());
}
