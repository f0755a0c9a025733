//! Follow relationship manager.

use inkfeed_common::{EngagementError, EngagementResult};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{Outcome, SkipReason};
use crate::services::gateway::FollowStoreService;
use crate::services::listener::{EngagementEvent, ListenerService};

/// Snapshot of a follow control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowView {
    pub is_following: bool,
    pub follower_count: u64,
    pub in_flight: bool,
}

struct FollowSlot {
    view: FollowView,
    /// Bumped by every toggle, so a refresh can tell its queries are stale.
    version: u64,
}

/// Follow manager for one (viewer, target profile) pair.
#[derive(Clone)]
pub struct FollowManager {
    target_id: String,
    viewer_id: Option<String>,
    follows: FollowStoreService,
    listener: ListenerService,
    slot: Arc<RwLock<FollowSlot>>,
}

impl FollowManager {
    /// Create a manager from known state, without querying.
    #[must_use]
    pub fn with_state(
        target_id: impl Into<String>,
        viewer_id: Option<String>,
        is_following: bool,
        follower_count: u64,
        follows: FollowStoreService,
        listener: ListenerService,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            viewer_id,
            follows,
            listener,
            slot: Arc::new(RwLock::new(FollowSlot {
                view: FollowView {
                    is_following,
                    follower_count,
                    in_flight: false,
                },
                version: 0,
            })),
        }
    }

    /// Create a manager and derive its state from the store.
    ///
    /// Query failures are reported to the listener and leave the defaults
    /// (not following, zero followers) in place.
    pub async fn load(
        target_id: impl Into<String>,
        viewer_id: Option<String>,
        follows: FollowStoreService,
        listener: ListenerService,
    ) -> Self {
        let manager = Self::with_state(target_id, viewer_id, false, 0, follows, listener);
        if let Err(error) = manager.refresh().await {
            debug!(target_id = %manager.target_id, error = %error, "Follow state load failed");
        }
        manager
    }

    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub async fn view(&self) -> FollowView {
        self.slot.read().await.view
    }

    fn is_self(&self) -> bool {
        self.viewer_id.as_deref() == Some(self.target_id.as_str())
    }

    /// Re-run the existence and count queries.
    ///
    /// A query that fails leaves its value as it was. Results are dropped if a
    /// toggle started while the queries ran.
    pub async fn refresh(&self) -> EngagementResult<Outcome> {
        let version = {
            let slot = self.slot.read().await;
            if slot.view.in_flight {
                return Ok(Outcome::Skipped(SkipReason::InFlight));
            }
            slot.version
        };

        let exists = async {
            match self.viewer_id.as_deref() {
                Some(viewer_id) if !self.is_self() => {
                    self.follows.exists(viewer_id, &self.target_id).await
                }
                _ => Ok(false),
            }
        };
        let (exists, count) = tokio::join!(exists, self.follows.count(&self.target_id));

        {
            let mut slot = self.slot.write().await;
            if slot.version != version {
                debug!(
                    target_id = %self.target_id,
                    "Discarding follow refresh, a toggle started meanwhile"
                );
                return Ok(Outcome::Skipped(SkipReason::Superseded));
            }
            if let Ok(is_following) = exists {
                slot.view.is_following = is_following;
            }
            if let Ok(follower_count) = count {
                slot.view.follower_count = follower_count;
            }
        }

        match exists.err().or(count.err()) {
            None => Ok(Outcome::Committed),
            Some(error) => {
                warn!(target_id = %self.target_id, error = %error, "Follow state query failed");
                self.report(EngagementError::fetch(&error)).await
            }
        }
    }

    /// Follow the target if not following, unfollow otherwise.
    pub async fn toggle(&self) -> EngagementResult<Outcome> {
        let Some(viewer_id) = self.viewer_id.as_deref() else {
            return self.report(EngagementError::Unauthenticated).await;
        };
        if self.is_self() {
            return self
                .report(EngagementError::ForbiddenOperation(
                    "cannot follow yourself".to_string(),
                ))
                .await;
        }

        let before = {
            let mut slot = self.slot.write().await;
            if slot.view.in_flight {
                return Ok(Outcome::Skipped(SkipReason::InFlight));
            }
            let before = slot.view;
            slot.version += 1;
            slot.view = FollowView {
                is_following: !before.is_following,
                follower_count: if before.is_following {
                    before.follower_count.saturating_sub(1)
                } else {
                    before.follower_count.saturating_add(1)
                },
                in_flight: true,
            };
            before
        };
        let following = !before.is_following;

        let result = self.follows.set(viewer_id, &self.target_id, following).await;

        match result {
            Ok(()) => {
                self.slot.write().await.view.in_flight = false;
                debug!(target_id = %self.target_id, following, "Follow settled");
                self.listener
                    .mutation_settled(EngagementEvent::FollowChanged {
                        follower_id: viewer_id.to_string(),
                        followee_id: self.target_id.clone(),
                        following,
                    })
                    .await;
                Ok(Outcome::Committed)
            }
            Err(error) => {
                self.slot.write().await.view = before;
                warn!(target_id = %self.target_id, following, error = %error, "Follow change failed");
                self.report(EngagementError::persistence(&error)).await
            }
        }
    }

    async fn report(&self, error: EngagementError) -> EngagementResult<Outcome> {
        self.listener.error_reported(error.clone()).await;
        Err(error)
    }
}
