//! A feed card: one item with its reaction, comment and author-follow managers.

use inkfeed_common::{EngagementConfig, EngagementError, EngagementResult};
use serde::Serialize;

use crate::models::{ContentItem, Outcome, ResolvedComment};
use crate::services::comment_thread::{CommentThread, ThreadPhase};
use crate::services::follow::FollowManager;
use crate::services::gateway::{Gateway, ReactionFacts};
use crate::services::listener::ListenerService;
use crate::services::reaction::ReactionController;

/// Everything a card renders, assembled from its managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub liked: bool,
    pub disliked: bool,
    pub like_count: u64,
    pub comment_count: u64,
    pub is_following: bool,
    pub follower_count: u64,
    pub comments: Vec<ResolvedComment>,
    pub thread_phase: ThreadPhase,
    pub reaction_pending: bool,
    pub comment_posting: bool,
    pub follow_pending: bool,
}

/// Engagement state of one content item for one viewer.
#[derive(Clone)]
pub struct ContentCard {
    item: ContentItem,
    reactions: ReactionController,
    thread: CommentThread,
    follow: FollowManager,
}

impl ContentCard {
    /// Build a card from state the caller already has.
    #[must_use]
    pub fn new(
        item: ContentItem,
        viewer_id: Option<String>,
        reaction: ReactionFacts,
        follow: FollowManager,
        gateway: &Gateway,
        listener: ListenerService,
    ) -> Self {
        let reactions = ReactionController::new(
            item.id.clone(),
            viewer_id.clone(),
            reaction,
            item.like_count,
            gateway.reactions.clone(),
            listener.clone(),
        );
        let thread = CommentThread::new(
            item.id.clone(),
            viewer_id,
            item.comment_count,
            gateway.comments.clone(),
            gateway.profiles.clone(),
            listener,
        );

        Self {
            item,
            reactions,
            thread,
            follow,
        }
    }

    /// Build a card, reading the viewer's reaction facts and the author's
    /// follow state from the store.
    ///
    /// Read failures are reported to the listener and fall back to defaults.
    pub async fn load(
        item: ContentItem,
        viewer_id: Option<String>,
        gateway: &Gateway,
        listener: ListenerService,
        config: EngagementConfig,
    ) -> Self {
        let reaction = match viewer_id.as_deref() {
            Some(viewer_id) => match gateway.reactions.facts(viewer_id, &item.id).await {
                Ok(facts) => facts,
                Err(error) => {
                    tracing::warn!(item_id = %item.id, error = %error, "Reaction facts lookup failed");
                    listener.error_reported(EngagementError::fetch(&error)).await;
                    ReactionFacts::default()
                }
            },
            None => ReactionFacts::default(),
        };

        let follow = FollowManager::load(
            item.author_id.clone(),
            viewer_id.clone(),
            gateway.follows.clone(),
            listener.clone(),
        )
        .await;

        let mut card = Self::new(item, viewer_id, reaction, follow, gateway, listener);
        card.thread = card.thread.with_config(config);
        card
    }

    #[must_use]
    pub const fn item(&self) -> &ContentItem {
        &self.item
    }

    #[must_use]
    pub const fn reactions(&self) -> &ReactionController {
        &self.reactions
    }

    #[must_use]
    pub const fn thread(&self) -> &CommentThread {
        &self.thread
    }

    #[must_use]
    pub const fn follow(&self) -> &FollowManager {
        &self.follow
    }

    /// Current view of the whole card.
    pub async fn view(&self) -> ViewState {
        let reaction = self.reactions.view().await;
        let thread = self.thread.view().await;
        let follow = self.follow.view().await;

        ViewState {
            liked: reaction.liked(),
            disliked: reaction.disliked(),
            like_count: reaction.like_count,
            comment_count: thread.comment_count,
            is_following: follow.is_following,
            follower_count: follow.follower_count,
            comments: thread.comments,
            thread_phase: thread.phase,
            reaction_pending: reaction.in_flight,
            comment_posting: thread.posting,
            follow_pending: follow.in_flight,
        }
    }

    pub async fn toggle_like(&self) -> EngagementResult<Outcome> {
        self.reactions.toggle_like().await
    }

    pub async fn toggle_dislike(&self) -> EngagementResult<Outcome> {
        self.reactions.toggle_dislike().await
    }

    pub async fn open_thread(&self) -> EngagementResult<Outcome> {
        self.thread.open().await
    }

    pub async fn close_thread(&self) {
        self.thread.close().await;
    }

    pub async fn post_comment(&self, body: &str) -> EngagementResult<Outcome> {
        self.thread.post(body).await
    }

    pub async fn toggle_follow(&self) -> EngagementResult<Outcome> {
        self.follow.toggle().await
    }
}
