//! Repositories wrapping `SeaORM` queries for each relation.

pub mod comment;
pub mod follow;
pub mod post;
pub mod profile;
pub mod reaction;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use post::{PostCounter, PostRepository};
pub use profile::ProfileRepository;
pub use reaction::{ReactionKind, ReactionRepository};

use inkfeed_common::AppError;
use sea_orm::{DbErr, SqlErr};

/// Map an insert failure, reporting unique-index violations as conflicts.
pub(crate) fn insert_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(e.to_string()),
    }
}
