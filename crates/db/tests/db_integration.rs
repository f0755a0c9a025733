//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `inkfeed_test`)
//!   `TEST_DB_PASSWORD` (default: `inkfeed_test`)
//!   `TEST_DB_NAME` (default: `inkfeed_test`)

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use inkfeed_common::AppError;
use inkfeed_db::entities::{follow, post, profile};
use inkfeed_db::repositories::{
    FollowRepository, PostCounter, PostRepository, ReactionKind, ReactionRepository,
};
use inkfeed_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};

async fn seed_profile(db: &TestDatabase, id: &str) {
    profile::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user {id}")),
        avatar_url: Set(None),
        created_at: Set(Utc::now().into()),
    }
    .insert(db.connection())
    .await
    .unwrap();
}

async fn seed_post(db: &TestDatabase, id: &str, author_id: &str) {
    post::ActiveModel {
        id: Set(id.to_string()),
        author_id: Set(author_id.to_string()),
        kind: Set(post::PostKind::Poem),
        title: Set("Untitled".to_string()),
        content: Set("Words".to_string()),
        like_count: Set(0),
        dislike_count: Set(0),
        comment_count: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(db.connection())
    .await
    .unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.unwrap();
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_like_rejected_by_unique_index() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_profile(&db, "u1").await;
    seed_post(&db, "p1", "u1").await;
    let repo = ReactionRepository::new(db.shared());

    let like = |id: &str| {
        ReactionRepository::create(db.connection(), ReactionKind::Like, id.to_string(), "u1", "p1")
    };

    like("l1").await.unwrap();
    let second = like("l2").await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
    assert_eq!(repo.count_by_post(ReactionKind::Like, "p1").await.unwrap(), 1);
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_self_follow_rejected_by_check() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_profile(&db, "u1").await;
    let repo = FollowRepository::new(db.shared());

    let result = repo
        .create(follow::ActiveModel {
            id: Set("f1".to_string()),
            follower_id: Set("u1".to_string()),
            followee_id: Set("u1".to_string()),
            created_at: Set(Utc::now().into()),
        })
        .await;

    assert!(result.is_err());
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_counter_never_negative() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_profile(&db, "u1").await;
    seed_post(&db, "p1", "u1").await;
    let repo = PostRepository::new(db.shared());

    PostRepository::decrement(db.connection(), "p1", PostCounter::Like)
        .await
        .unwrap();

    assert_eq!(repo.get_by_id("p1").await.unwrap().like_count, 0);
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_uncommitted_reaction_leaves_no_row() {
    let db = TestDatabase::create_unique().await.unwrap();
    seed_profile(&db, "u1").await;
    seed_post(&db, "p1", "u1").await;
    let reactions = ReactionRepository::new(db.shared());
    let posts = PostRepository::new(db.shared());

    let txn = db.connection().begin().await.unwrap();
    ReactionRepository::create(&txn, ReactionKind::Like, "l1".to_string(), "u1", "p1")
        .await
        .unwrap();
    PostRepository::increment(&txn, "p1", PostCounter::Like)
        .await
        .unwrap();
    txn.rollback().await.unwrap();

    assert!(!reactions.exists(ReactionKind::Like, "u1", "p1").await.unwrap());
    assert_eq!(posts.get_by_id("p1").await.unwrap().like_count, 0);
    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.ends_with("/postgres"));
}
