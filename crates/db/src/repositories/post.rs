//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use inkfeed_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr,
};

/// Denormalized counters kept on a post row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Like,
    Dislike,
    Comment,
}

impl PostCounter {
    const fn column(self) -> post::Column {
        match self {
            Self::Like => post::Column::LikeCount,
            Self::Dislike => post::Column::DislikeCount,
            Self::Comment => post::Column::CommentCount,
        }
    }

    const fn column_name(self) -> &'static str {
        match self {
            Self::Like => "like_count",
            Self::Dislike => "dislike_count",
            Self::Comment => "comment_count",
        }
    }
}

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {id}")))
    }

    /// Increment a counter atomically (single UPDATE query, no fetch).
    ///
    /// Takes the connection explicitly so the update can join a transaction.
    pub async fn increment<C: ConnectionTrait>(
        conn: &C,
        post_id: &str,
        counter: PostCounter,
    ) -> AppResult<()> {
        let name = counter.column_name();
        Self::update_counter(conn, post_id, counter, format!("{name} + 1")).await
    }

    /// Decrement a counter atomically, never below zero.
    pub async fn decrement<C: ConnectionTrait>(
        conn: &C,
        post_id: &str,
        counter: PostCounter,
    ) -> AppResult<()> {
        let name = counter.column_name();
        Self::update_counter(conn, post_id, counter, format!("GREATEST({name} - 1, 0)")).await
    }

    async fn update_counter<C: ConnectionTrait>(
        conn: &C,
        post_id: &str,
        counter: PostCounter,
        expr: String,
    ) -> AppResult<()> {
        Post::update_many()
            .col_expr(counter.column(), Expr::cust(expr))
            .filter(post::Column::Id.eq(post_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
