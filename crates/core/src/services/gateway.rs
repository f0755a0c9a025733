//! Persistence gateway.
//!
//! The operations the engagement managers need from the remote store, split
//! per relation. Managers only ever talk to these traits; the `SeaORM`
//! implementation lives in [`crate::services::database_gateway`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkfeed_common::{AppError, AppResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// The viewer's reaction rows for one item, as stored.
///
/// Both flags may be set if the store does not enforce exclusivity; callers
/// normalize that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReactionFacts {
    pub liked: bool,
    pub disliked: bool,
}

/// A stored comment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub id: String,
    pub item_id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Display information for a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub avatar: Option<String>,
}

/// A follow edge. The follower and the target always differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FollowRelationship {
    pub follower_id: String,
    pub target_id: String,
}

impl FollowRelationship {
    /// Build an edge, rejecting self-follows.
    pub fn new(follower_id: &str, target_id: &str) -> AppResult<Self> {
        if follower_id == target_id {
            return Err(AppError::Validation("cannot follow yourself".to_string()));
        }
        Ok(Self {
            follower_id: follower_id.to_string(),
            target_id: target_id.to_string(),
        })
    }
}

/// Like/dislike membership operations.
#[async_trait]
pub trait ReactionStore: Send + Sync {
    /// Make the like fact for (viewer, item) present or absent. Idempotent.
    async fn set_like(&self, viewer_id: &str, item_id: &str, present: bool) -> AppResult<()>;

    /// Make the dislike fact for (viewer, item) present or absent. Idempotent.
    async fn set_dislike(&self, viewer_id: &str, item_id: &str, present: bool) -> AppResult<()>;

    /// Read which reaction facts exist for (viewer, item).
    async fn facts(&self, viewer_id: &str, item_id: &str) -> AppResult<ReactionFacts>;

    /// Count like facts on an item.
    async fn count_likes(&self, item_id: &str) -> AppResult<u64>;
}

/// Comment rows of an item.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments on an item, newest first.
    async fn list(&self, item_id: &str) -> AppResult<Vec<CommentRecord>>;

    /// Insert a comment authored by `viewer_id`.
    async fn create(&self, item_id: &str, viewer_id: &str, body: &str) -> AppResult<()>;
}

/// Profile display lookups.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Resolve many identities at once. Unknown identities are simply absent
    /// from the returned map.
    async fn display_info_many(&self, ids: &[String])
    -> AppResult<HashMap<String, ProfileSummary>>;

    /// Resolve a single identity.
    async fn display_info(&self, id: &str) -> AppResult<Option<ProfileSummary>> {
        let mut found = self.display_info_many(&[id.to_string()]).await?;
        Ok(found.remove(id))
    }
}

/// Follow relationship operations.
#[async_trait]
pub trait FollowStore: Send + Sync {
    /// Whether `follower_id` follows `target_id`.
    async fn exists(&self, follower_id: &str, target_id: &str) -> AppResult<bool>;

    /// Number of relationships targeting `target_id`.
    async fn count(&self, target_id: &str) -> AppResult<u64>;

    /// Make the relationship present or absent. Idempotent.
    async fn set(&self, follower_id: &str, target_id: &str, present: bool) -> AppResult<()>;
}

pub type ReactionStoreService = Arc<dyn ReactionStore>;
pub type CommentStoreService = Arc<dyn CommentStore>;
pub type ProfileDirectoryService = Arc<dyn ProfileDirectory>;
pub type FollowStoreService = Arc<dyn FollowStore>;

/// Bundle of every store the managers use.
#[derive(Clone)]
pub struct Gateway {
    pub reactions: ReactionStoreService,
    pub comments: CommentStoreService,
    pub profiles: ProfileDirectoryService,
    pub follows: FollowStoreService,
}

impl Gateway {
    /// Create a gateway from individual stores.
    #[must_use]
    pub fn new(
        reactions: ReactionStoreService,
        comments: CommentStoreService,
        profiles: ProfileDirectoryService,
        follows: FollowStoreService,
    ) -> Self {
        Self {
            reactions,
            comments,
            profiles,
            follows,
        }
    }

    /// Create a gateway where one value implements every store.
    #[must_use]
    pub fn from_shared<G>(store: Arc<G>) -> Self
    where
        G: ReactionStore + CommentStore + ProfileDirectory + FollowStore + 'static,
    {
        Self {
            reactions: store.clone(),
            comments: store.clone(),
            profiles: store.clone(),
            follows: store,
        }
    }
}
