//! Engagement notifications.
//!
//! Managers report two things to the surrounding application: mutations that
//! settled remotely (so ancestors can refresh aggregates) and classified
//! errors (for toasts, logs or a sign-in redirect).

use async_trait::async_trait;
use inkfeed_common::EngagementError;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::services::reaction::ReactionState;

/// A remote mutation that settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngagementEvent {
    /// The viewer's reaction to an item changed.
    ReactionChanged {
        item_id: String,
        viewer_id: String,
        state: ReactionState,
    },
    /// The viewer posted a comment on an item.
    CommentPosted { item_id: String, viewer_id: String },
    /// The viewer followed or unfollowed a profile.
    FollowChanged {
        follower_id: String,
        followee_id: String,
        following: bool,
    },
}

/// Anything a listener can be told, as delivered by [`ChannelListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Settled(EngagementEvent),
    Failed(EngagementError),
}

/// Receiver of engagement notifications.
#[async_trait]
pub trait EngagementListener: Send + Sync {
    /// Called after a remote mutation settled.
    async fn mutation_settled(&self, event: EngagementEvent);

    /// Called for every error an action returns.
    async fn error_reported(&self, error: EngagementError);
}

/// A listener that drops every notification.
#[derive(Clone, Default)]
pub struct NoOpListener;

#[async_trait]
impl EngagementListener for NoOpListener {
    async fn mutation_settled(&self, _event: EngagementEvent) {}

    async fn error_reported(&self, _error: EngagementError) {}
}

/// A listener that forwards notifications into an unbounded channel.
#[derive(Clone)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, notice: Notice) {
        // The view that owned the receiver may already be gone.
        if self.tx.send(notice).is_err() {
            tracing::debug!("Engagement notice dropped, receiver closed");
        }
    }
}

#[async_trait]
impl EngagementListener for ChannelListener {
    async fn mutation_settled(&self, event: EngagementEvent) {
        self.send(Notice::Settled(event));
    }

    async fn error_reported(&self, error: EngagementError) {
        tracing::debug!(code = error.error_code(), error = %error, "Engagement error reported");
        self.send(Notice::Failed(error));
    }
}

/// Shared listener handle.
pub type ListenerService = Arc<dyn EngagementListener>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_listener_forwards_in_order() {
        let (listener, mut rx) = ChannelListener::new();

        listener
            .mutation_settled(EngagementEvent::CommentPosted {
                item_id: "p1".to_string(),
                viewer_id: "u1".to_string(),
            })
            .await;
        listener
            .error_reported(EngagementError::Unauthenticated)
            .await;

        assert!(matches!(
            rx.recv().await.unwrap(),
            Notice::Settled(EngagementEvent::CommentPosted { .. })
        ));
        assert_eq!(
            rx.recv().await.unwrap(),
            Notice::Failed(EngagementError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_channel_listener_survives_closed_receiver() {
        let (listener, rx) = ChannelListener::new();
        drop(rx);

        listener
            .error_reported(EngagementError::Fetch("gone".to_string()))
            .await;
    }
}
