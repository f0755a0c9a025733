//! `SeaORM`-backed implementation of the persistence gateway.

use async_trait::async_trait;
use chrono::Utc;
use inkfeed_common::{AppError, AppResult, IdGenerator};
use inkfeed_db::entities::{comment, follow};
use inkfeed_db::repositories::{
    CommentRepository, FollowRepository, PostCounter, PostRepository, ProfileRepository,
    ReactionKind, ReactionRepository,
};
use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, Set, TransactionTrait};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::models::ContentItem;
use crate::services::gateway::{
    CommentRecord, CommentStore, FollowRelationship, FollowStore, Gateway, ProfileDirectory,
    ProfileSummary, ReactionFacts, ReactionStore,
};

/// Input for creating a comment.
#[derive(Debug, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
}

impl TryFrom<comment::Model> for CommentRecord {
    type Error = AppError;

    fn try_from(model: comment::Model) -> AppResult<Self> {
        if model.content.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "comment {} has an empty body",
                model.id
            )));
        }
        if model.user_id.is_empty() {
            return Err(AppError::Validation(format!(
                "comment {} has no author",
                model.id
            )));
        }

        Ok(Self {
            id: model.id,
            item_id: model.post_id,
            author_id: model.user_id,
            body: model.content,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

const fn counter_for(kind: ReactionKind) -> PostCounter {
    match kind {
        ReactionKind::Like => PostCounter::Like,
        ReactionKind::Dislike => PostCounter::Dislike,
    }
}

/// Gateway over the database repositories.
///
/// A row write and the matching post counter update share one transaction.
#[derive(Clone)]
pub struct DatabaseGateway {
    db: Arc<DatabaseConnection>,
    posts: PostRepository,
    profiles: ProfileRepository,
    reactions: ReactionRepository,
    comments: CommentRepository,
    follows: FollowRepository,
    id_gen: IdGenerator,
}

impl DatabaseGateway {
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            posts: PostRepository::new(db.clone()),
            profiles: ProfileRepository::new(db.clone()),
            reactions: ReactionRepository::new(db.clone()),
            comments: CommentRepository::new(db.clone()),
            follows: FollowRepository::new(db.clone()),
            db,
            id_gen: IdGenerator::new(),
        }
    }

    /// Wrap this gateway for use by the managers.
    #[must_use]
    pub fn into_gateway(self) -> Gateway {
        Gateway::from_shared(Arc::new(self))
    }

    /// Load a content item by ID.
    pub async fn load_item(&self, id: &str) -> AppResult<ContentItem> {
        Ok(self.posts.get_by_id(id).await?.into())
    }

    async fn begin(&self) -> AppResult<DatabaseTransaction> {
        self.db.begin().await.map_err(db_err)
    }

    async fn set_reaction(
        &self,
        kind: ReactionKind,
        viewer_id: &str,
        item_id: &str,
        present: bool,
    ) -> AppResult<()> {
        let txn = self.begin().await?;

        let changed = if present {
            let exists = ReactionRepository::exists_in(&txn, kind, viewer_id, item_id).await?;
            if !exists {
                let id = self.id_gen.generate();
                match ReactionRepository::create(&txn, kind, id, viewer_id, item_id).await {
                    Ok(()) => {}
                    // A concurrent writer inserted the row and adjusted the counter.
                    Err(AppError::Conflict(_)) => return Ok(()),
                    Err(e) => return Err(e),
                }
            }
            !exists
        } else {
            ReactionRepository::delete(&txn, kind, viewer_id, item_id).await? > 0
        };

        if changed {
            let counter = counter_for(kind);
            if present {
                PostRepository::increment(&txn, item_id, counter).await?;
            } else {
                PostRepository::decrement(&txn, item_id, counter).await?;
            }
        }

        // Dropping the transaction on an early return rolls it back.
        txn.commit().await.map_err(db_err)
    }
}

#[async_trait]
impl ReactionStore for DatabaseGateway {
    async fn set_like(&self, viewer_id: &str, item_id: &str, present: bool) -> AppResult<()> {
        self.set_reaction(ReactionKind::Like, viewer_id, item_id, present)
            .await
    }

    async fn set_dislike(&self, viewer_id: &str, item_id: &str, present: bool) -> AppResult<()> {
        self.set_reaction(ReactionKind::Dislike, viewer_id, item_id, present)
            .await
    }

    async fn facts(&self, viewer_id: &str, item_id: &str) -> AppResult<ReactionFacts> {
        let liked = self
            .reactions
            .exists(ReactionKind::Like, viewer_id, item_id)
            .await?;
        let disliked = self
            .reactions
            .exists(ReactionKind::Dislike, viewer_id, item_id)
            .await?;
        Ok(ReactionFacts { liked, disliked })
    }

    async fn count_likes(&self, item_id: &str) -> AppResult<u64> {
        self.reactions
            .count_by_post(ReactionKind::Like, item_id)
            .await
    }
}

#[async_trait]
impl CommentStore for DatabaseGateway {
    async fn list(&self, item_id: &str) -> AppResult<Vec<CommentRecord>> {
        let rows = self.comments.find_by_post(item_id).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match CommentRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(item_id = %item_id, error = %e, "Skipping invalid comment row");
                    None
                }
            })
            .collect())
    }

    async fn create(&self, item_id: &str, viewer_id: &str, body: &str) -> AppResult<()> {
        let input = NewComment {
            body: body.to_string(),
        };
        input.validate()?;

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(item_id.to_string()),
            user_id: Set(viewer_id.to_string()),
            content: Set(input.body),
            created_at: Set(Utc::now().into()),
        };
        let txn = self.begin().await?;
        CommentRepository::create(&txn, model).await?;
        PostRepository::increment(&txn, item_id, PostCounter::Comment).await?;
        txn.commit().await.map_err(db_err)
    }
}

#[async_trait]
impl ProfileDirectory for DatabaseGateway {
    async fn display_info_many(
        &self,
        ids: &[String],
    ) -> AppResult<HashMap<String, ProfileSummary>> {
        let profiles = self.profiles.find_by_ids(ids).await?;

        Ok(profiles
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    ProfileSummary {
                        name: p.username,
                        avatar: p.avatar_url,
                    },
                )
            })
            .collect())
    }
}

#[async_trait]
impl FollowStore for DatabaseGateway {
    async fn exists(&self, follower_id: &str, target_id: &str) -> AppResult<bool> {
        self.follows.is_following(follower_id, target_id).await
    }

    async fn count(&self, target_id: &str) -> AppResult<u64> {
        self.follows.count_followers(target_id).await
    }

    async fn set(&self, follower_id: &str, target_id: &str, present: bool) -> AppResult<()> {
        let edge = FollowRelationship::new(follower_id, target_id)?;

        if !present {
            self.follows
                .delete_by_pair(&edge.follower_id, &edge.target_id)
                .await?;
            return Ok(());
        }

        if self
            .follows
            .is_following(&edge.follower_id, &edge.target_id)
            .await?
        {
            return Ok(());
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(edge.follower_id),
            followee_id: Set(edge.target_id),
            created_at: Set(Utc::now().into()),
        };
        match self.follows.create(model).await {
            Ok(_) | Err(AppError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
