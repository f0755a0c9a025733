//! Like/dislike state machine with optimistic updates.

use inkfeed_common::{AppError, EngagementError, EngagementResult};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{Outcome, SkipReason};
use crate::services::gateway::{ReactionFacts, ReactionStore, ReactionStoreService};
use crate::services::listener::{EngagementEvent, ListenerService};

/// The viewer's reaction to an item. Never both liked and disliked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionState {
    #[default]
    None,
    Liked,
    Disliked,
}

/// A press on one of the two reaction controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionEvent {
    LikePressed,
    DislikePressed,
}

/// One remote membership change, applied in plan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStep {
    SetLike(bool),
    SetDislike(bool),
}

impl RemoteStep {
    const fn apply(self, state: ReactionState) -> ReactionState {
        match (self, state) {
            (Self::SetLike(true), _) => ReactionState::Liked,
            (Self::SetDislike(true), _) => ReactionState::Disliked,
            (Self::SetLike(false), ReactionState::Liked)
            | (Self::SetDislike(false), ReactionState::Disliked) => ReactionState::None,
            (Self::SetLike(false) | Self::SetDislike(false), other) => other,
        }
    }

    const fn adjust_likes(self, like_count: u64) -> u64 {
        match self {
            Self::SetLike(true) => like_count.saturating_add(1),
            Self::SetLike(false) => like_count.saturating_sub(1),
            Self::SetDislike(_) => like_count,
        }
    }
}

impl ReactionState {
    /// Normalize stored facts. If both are present the like wins.
    #[must_use]
    pub const fn from_flags(liked: bool, disliked: bool) -> Self {
        match (liked, disliked) {
            (true, _) => Self::Liked,
            (false, true) => Self::Disliked,
            (false, false) => Self::None,
        }
    }

    #[must_use]
    pub const fn is_liked(self) -> bool {
        matches!(self, Self::Liked)
    }

    #[must_use]
    pub const fn is_disliked(self) -> bool {
        matches!(self, Self::Disliked)
    }

    /// Work out what a press does from this state.
    ///
    /// Switching from one reaction to the other deletes the old fact before
    /// inserting the new one.
    #[must_use]
    pub fn plan(self, event: ReactionEvent) -> ReactionPlan {
        let steps = match (self, event) {
            (Self::None, ReactionEvent::LikePressed) => vec![RemoteStep::SetLike(true)],
            (Self::Liked, ReactionEvent::LikePressed) => vec![RemoteStep::SetLike(false)],
            (Self::Disliked, ReactionEvent::LikePressed) => {
                vec![RemoteStep::SetDislike(false), RemoteStep::SetLike(true)]
            }
            (Self::None, ReactionEvent::DislikePressed) => vec![RemoteStep::SetDislike(true)],
            (Self::Disliked, ReactionEvent::DislikePressed) => {
                vec![RemoteStep::SetDislike(false)]
            }
            (Self::Liked, ReactionEvent::DislikePressed) => {
                vec![RemoteStep::SetLike(false), RemoteStep::SetDislike(true)]
            }
        };

        ReactionPlan::new(self, steps)
    }
}

impl From<ReactionFacts> for ReactionState {
    fn from(facts: ReactionFacts) -> Self {
        Self::from_flags(facts.liked, facts.disliked)
    }
}

/// How far a plan got against the store.
#[derive(Debug)]
pub struct CommitReport {
    /// Number of leading steps that succeeded.
    pub completed: usize,
    /// The failure that stopped the plan, if any.
    pub error: Option<AppError>,
}

/// The effect of a single press: the state to show right away, the remote
/// steps to run, and the state to fall back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionPlan {
    pub rollback: ReactionState,
    pub optimistic: ReactionState,
    pub steps: Vec<RemoteStep>,
}

impl ReactionPlan {
    fn new(rollback: ReactionState, steps: Vec<RemoteStep>) -> Self {
        let optimistic = steps.iter().fold(rollback, |state, step| step.apply(state));
        Self {
            rollback,
            optimistic,
            steps,
        }
    }

    /// State after the first `completed` steps succeeded.
    #[must_use]
    pub fn settle(&self, completed: usize) -> ReactionState {
        self.steps
            .iter()
            .take(completed)
            .fold(self.rollback, |state, step| step.apply(state))
    }

    /// Like count after the first `completed` steps, starting from `before`.
    #[must_use]
    pub fn like_count_after(&self, before: u64, completed: usize) -> u64 {
        self.steps
            .iter()
            .take(completed)
            .fold(before, |count, step| step.adjust_likes(count))
    }

    /// Like count to show while the plan is in flight.
    #[must_use]
    pub fn optimistic_like_count(&self, before: u64) -> u64 {
        self.like_count_after(before, self.steps.len())
    }

    /// Run the steps in order, stopping at the first failure.
    pub async fn commit(
        &self,
        store: &dyn ReactionStore,
        viewer_id: &str,
        item_id: &str,
    ) -> CommitReport {
        let mut completed = 0;
        for step in &self.steps {
            let result = match *step {
                RemoteStep::SetLike(present) => store.set_like(viewer_id, item_id, present).await,
                RemoteStep::SetDislike(present) => {
                    store.set_dislike(viewer_id, item_id, present).await
                }
            };
            if let Err(error) = result {
                return CommitReport {
                    completed,
                    error: Some(error),
                };
            }
            completed += 1;
        }

        CommitReport {
            completed,
            error: None,
        }
    }
}

/// Snapshot of a reaction control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionView {
    pub state: ReactionState,
    pub like_count: u64,
    pub in_flight: bool,
}

impl ReactionView {
    #[must_use]
    pub const fn liked(&self) -> bool {
        self.state.is_liked()
    }

    #[must_use]
    pub const fn disliked(&self) -> bool {
        self.state.is_disliked()
    }
}

struct ReactionSlot {
    view: ReactionView,
    /// Bumped by every press, so a reconcile can tell its fetch is stale.
    version: u64,
}

/// Reaction controller for one (viewer, item) pair.
#[derive(Clone)]
pub struct ReactionController {
    item_id: String,
    viewer_id: Option<String>,
    reactions: ReactionStoreService,
    listener: ListenerService,
    slot: Arc<RwLock<ReactionSlot>>,
}

impl ReactionController {
    /// Create a controller from the facts the caller already knows.
    #[must_use]
    pub fn new(
        item_id: impl Into<String>,
        viewer_id: Option<String>,
        initial: ReactionFacts,
        like_count: u64,
        reactions: ReactionStoreService,
        listener: ListenerService,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            viewer_id,
            reactions,
            listener,
            slot: Arc::new(RwLock::new(ReactionSlot {
                view: ReactionView {
                    state: initial.into(),
                    like_count,
                    in_flight: false,
                },
                version: 0,
            })),
        }
    }

    /// Current snapshot.
    pub async fn view(&self) -> ReactionView {
        self.slot.read().await.view
    }

    /// Press the like control.
    pub async fn toggle_like(&self) -> EngagementResult<Outcome> {
        self.press(ReactionEvent::LikePressed).await
    }

    /// Press the dislike control.
    pub async fn toggle_dislike(&self) -> EngagementResult<Outcome> {
        self.press(ReactionEvent::DislikePressed).await
    }

    async fn press(&self, event: ReactionEvent) -> EngagementResult<Outcome> {
        let Some(viewer_id) = self.viewer_id.as_deref() else {
            return self.report(EngagementError::Unauthenticated).await;
        };

        let (plan, like_count_before) = {
            let mut slot = self.slot.write().await;
            if slot.view.in_flight {
                debug!(item_id = %self.item_id, ?event, "Reaction press ignored, request in flight");
                return Ok(Outcome::Skipped(SkipReason::InFlight));
            }

            let plan = slot.view.state.plan(event);
            let before = slot.view.like_count;
            slot.version += 1;
            slot.view = ReactionView {
                state: plan.optimistic,
                like_count: plan.optimistic_like_count(before),
                in_flight: true,
            };
            (plan, before)
        };

        let report = plan
            .commit(self.reactions.as_ref(), viewer_id, &self.item_id)
            .await;

        let settled = plan.settle(report.completed);
        self.slot.write().await.view = ReactionView {
            state: settled,
            like_count: plan.like_count_after(like_count_before, report.completed),
            in_flight: false,
        };

        // Any completed step changed remote data, even if a later one failed.
        if report.completed > 0 {
            self.listener
                .mutation_settled(EngagementEvent::ReactionChanged {
                    item_id: self.item_id.clone(),
                    viewer_id: viewer_id.to_string(),
                    state: settled,
                })
                .await;
        }

        match report.error {
            None => {
                debug!(item_id = %self.item_id, state = ?settled, "Reaction settled");
                Ok(Outcome::Committed)
            }
            Some(error) => {
                warn!(
                    item_id = %self.item_id,
                    completed = report.completed,
                    state = ?settled,
                    error = %error,
                    "Reaction change failed"
                );
                self.report(EngagementError::persistence(&error)).await
            }
        }
    }

    /// Replace the local projection with what the store holds.
    ///
    /// The fetched facts are dropped if a press started after the fetch did.
    pub async fn reconcile(&self) -> EngagementResult<Outcome> {
        let version = {
            let slot = self.slot.read().await;
            if slot.view.in_flight {
                return Ok(Outcome::Skipped(SkipReason::InFlight));
            }
            slot.version
        };

        let facts = async {
            match self.viewer_id.as_deref() {
                Some(viewer_id) => self.reactions.facts(viewer_id, &self.item_id).await,
                None => Ok(ReactionFacts::default()),
            }
        };
        let fetched = tokio::try_join!(facts, self.reactions.count_likes(&self.item_id));

        let (facts, like_count) = match fetched {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(item_id = %self.item_id, error = %error, "Reaction reconcile failed");
                return self.report(EngagementError::fetch(&error)).await;
            }
        };

        let mut slot = self.slot.write().await;
        if slot.version != version {
            debug!(item_id = %self.item_id, "Discarding reconcile, a press started meanwhile");
            return Ok(Outcome::Skipped(SkipReason::Superseded));
        }
        slot.view.state = facts.into();
        slot.view.like_count = like_count;
        Ok(Outcome::Committed)
    }

    async fn report(&self, error: EngagementError) -> EngagementResult<Outcome> {
        self.listener.error_reported(error.clone()).await;
        Err(error)
    }
}
