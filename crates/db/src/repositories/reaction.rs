//! Reaction repository (the `likes` and `dislikes` relations).

use std::sync::Arc;

use crate::entities::{Dislike, Like, dislike, like};
use inkfeed_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};

/// Which reaction relation a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    /// The `likes` relation.
    Like,
    /// The `dislikes` relation.
    Dislike,
}

/// Reaction repository for database operations.
#[derive(Clone)]
pub struct ReactionRepository {
    db: Arc<DatabaseConnection>,
}

impl ReactionRepository {
    /// Create a new reaction repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user has a reaction of the given kind on a post.
    pub async fn exists(&self, kind: ReactionKind, user_id: &str, post_id: &str) -> AppResult<bool> {
        Self::exists_in(self.db.as_ref(), kind, user_id, post_id).await
    }

    /// [`ReactionRepository::exists`] on an explicit connection or transaction.
    pub async fn exists_in<C: ConnectionTrait>(
        db: &C,
        kind: ReactionKind,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<bool> {
        let found = match kind {
            ReactionKind::Like => Like::find()
                .filter(like::Column::UserId.eq(user_id))
                .filter(like::Column::PostId.eq(post_id))
                .one(db)
                .await
                .map(|m| m.is_some()),
            ReactionKind::Dislike => Dislike::find()
                .filter(dislike::Column::UserId.eq(user_id))
                .filter(dislike::Column::PostId.eq(post_id))
                .one(db)
                .await
                .map(|m| m.is_some()),
        };
        found.map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a reaction row.
    ///
    /// A row already present for the pair is reported as [`AppError::Conflict`].
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        kind: ReactionKind,
        id: String,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<()> {
        let result = match kind {
            ReactionKind::Like => like::ActiveModel {
                id: Set(id),
                user_id: Set(user_id.to_string()),
                post_id: Set(post_id.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await
            .map(|_| ()),
            ReactionKind::Dislike => dislike::ActiveModel {
                id: Set(id),
                user_id: Set(user_id.to_string()),
                post_id: Set(post_id.to_string()),
                ..Default::default()
            }
            .insert(db)
            .await
            .map(|_| ()),
        };
        result.map_err(super::insert_err)
    }

    /// Delete a user's reaction of the given kind. Returns the number of rows removed.
    pub async fn delete<C: ConnectionTrait>(
        db: &C,
        kind: ReactionKind,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<u64> {
        let result = match kind {
            ReactionKind::Like => Like::delete_many()
                .filter(like::Column::UserId.eq(user_id))
                .filter(like::Column::PostId.eq(post_id))
                .exec(db)
                .await,
            ReactionKind::Dislike => Dislike::delete_many()
                .filter(dislike::Column::UserId.eq(user_id))
                .filter(dislike::Column::PostId.eq(post_id))
                .exec(db)
                .await,
        };
        result
            .map(|r| r.rows_affected)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count reactions of the given kind on a post.
    pub async fn count_by_post(&self, kind: ReactionKind, post_id: &str) -> AppResult<u64> {
        let db = self.db.as_ref();
        let count = match kind {
            ReactionKind::Like => {
                Like::find()
                    .filter(like::Column::PostId.eq(post_id))
                    .count(db)
                    .await
            }
            ReactionKind::Dislike => {
                Dislike::find()
                    .filter(dislike::Column::PostId.eq(post_id))
                    .count(db)
                    .await
            }
        };
        count.map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_like(id: &str, user_id: &str, post_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            post_id: post_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_exists_like_true() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like("l1", "user1", "post1")]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .exists(ReactionKind::Like, "user1", "post1")
            .await
            .unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_exists_dislike_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<dislike::Model>::new()])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let result = repo
            .exists(ReactionKind::Dislike, "user1", "post1")
            .await
            .unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_create_like() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_like("l1", "user1", "post1")]])
                .into_connection(),
        );

        let result = ReactionRepository::create(
            db.as_ref(),
            ReactionKind::Like,
            "l1".to_string(),
            "user1",
            "post1",
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_reports_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let removed =
            ReactionRepository::delete(db.as_ref(), ReactionKind::Dislike, "user1", "post1")
                .await
                .unwrap();

        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_count_likes() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(24))
                }]])
                .into_connection(),
        );

        let repo = ReactionRepository::new(db);
        let count = repo
            .count_by_post(ReactionKind::Like, "post1")
            .await
            .unwrap();

        assert_eq!(count, 24);
    }
}
