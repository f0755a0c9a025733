//! Comment thread of a single item.
//!
//! The thread is lazily materialized: nothing is fetched until [`CommentThread::open`]
//! is called, and closing it discards the list. Each open takes a generation
//! number and a fetch result is only applied if its generation is still the
//! latest one issued, so overlapping opens resolve last-issued-wins.

use inkfeed_common::{EngagementConfig, EngagementError, EngagementResult};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::models::{Outcome, ResolvedComment, SkipReason};
use crate::services::gateway::{
    CommentRecord, CommentStoreService, ProfileDirectoryService, ProfileSummary,
};
use crate::services::listener::{EngagementEvent, ListenerService};

/// Lifecycle of the materialized list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadPhase {
    #[default]
    Closed,
    Loading,
    Loaded,
}

/// Snapshot of a comment thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThreadView {
    pub phase: ThreadPhase,
    pub comments: Vec<ResolvedComment>,
    pub comment_count: u64,
    pub draft: String,
    pub posting: bool,
}

#[derive(Default)]
struct ThreadState {
    view: ThreadView,
    generation: u64,
}

/// Comment thread manager for one (viewer, item) pair.
#[derive(Clone)]
pub struct CommentThread {
    item_id: String,
    viewer_id: Option<String>,
    comments: CommentStoreService,
    profiles: ProfileDirectoryService,
    listener: ListenerService,
    config: Arc<EngagementConfig>,
    state: Arc<RwLock<ThreadState>>,
}

impl CommentThread {
    #[must_use]
    pub fn new(
        item_id: impl Into<String>,
        viewer_id: Option<String>,
        comment_count: u64,
        comments: CommentStoreService,
        profiles: ProfileDirectoryService,
        listener: ListenerService,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            viewer_id,
            comments,
            profiles,
            listener,
            config: Arc::new(EngagementConfig::default()),
            state: Arc::new(RwLock::new(ThreadState {
                view: ThreadView {
                    comment_count,
                    ..ThreadView::default()
                },
                generation: 0,
            })),
        }
    }

    /// Use the given placeholder label and avatar for unresolved authors.
    #[must_use]
    pub fn with_config(mut self, config: EngagementConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub async fn view(&self) -> ThreadView {
        self.state.read().await.view.clone()
    }

    pub async fn draft(&self) -> String {
        self.state.read().await.view.draft.clone()
    }

    pub async fn set_draft(&self, body: impl Into<String>) {
        self.state.write().await.view.draft = body.into();
    }

    /// Post whatever is in the draft buffer.
    pub async fn submit_draft(&self) -> EngagementResult<Outcome> {
        let body = self.draft().await;
        self.post(&body).await
    }

    /// Fetch the comments and replace the materialized list.
    ///
    /// A fetch failure leaves the thread loaded with an empty list.
    pub async fn open(&self) -> EngagementResult<Outcome> {
        let generation = {
            let mut state = self.state.write().await;
            state.generation += 1;
            state.view.phase = ThreadPhase::Loading;
            state.generation
        };

        let fetched = self.fetch().await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            warn!(
                item_id = %self.item_id,
                generation,
                current = state.generation,
                "Discarding stale comment fetch"
            );
            return Ok(Outcome::Skipped(SkipReason::Superseded));
        }

        state.view.phase = ThreadPhase::Loaded;
        match fetched {
            Ok(comments) => {
                state.view.comments = comments;
                Ok(Outcome::Committed)
            }
            Err(error) => {
                state.view.comments.clear();
                drop(state);
                self.report(error).await
            }
        }
    }

    /// Discard the materialized list. Any fetch still running is ignored.
    pub async fn close(&self) {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.view.phase = ThreadPhase::Closed;
        state.view.comments.clear();
    }

    /// Post a comment as the viewer, then refresh the list.
    pub async fn post(&self, body: &str) -> EngagementResult<Outcome> {
        let Some(viewer_id) = self.viewer_id.as_deref() else {
            return self.report(EngagementError::Unauthenticated).await;
        };

        let body = body.trim();
        if body.is_empty() {
            return Ok(Outcome::Skipped(SkipReason::EmptyBody));
        }

        {
            let mut state = self.state.write().await;
            if state.view.posting {
                return Ok(Outcome::Skipped(SkipReason::InFlight));
            }
            state.view.posting = true;
            state.view.comment_count += 1;
        }

        let created = self.comments.create(&self.item_id, viewer_id, body).await;

        match created {
            Ok(()) => {
                {
                    let mut state = self.state.write().await;
                    state.view.posting = false;
                    state.view.draft.clear();
                }
                debug!(item_id = %self.item_id, "Comment posted");
                self.listener
                    .mutation_settled(EngagementEvent::CommentPosted {
                        item_id: self.item_id.clone(),
                        viewer_id: viewer_id.to_string(),
                    })
                    .await;

                // A failed refresh is reported by open itself.
                if let Err(error) = self.open().await {
                    debug!(item_id = %self.item_id, error = %error, "Refresh after post failed");
                }
                Ok(Outcome::Committed)
            }
            Err(error) => {
                {
                    let mut state = self.state.write().await;
                    state.view.posting = false;
                    state.view.comment_count = state.view.comment_count.saturating_sub(1);
                }
                warn!(item_id = %self.item_id, error = %error, "Comment post failed");
                self.report(EngagementError::persistence(&error)).await
            }
        }
    }

    async fn fetch(&self) -> EngagementResult<Vec<ResolvedComment>> {
        let records = self
            .comments
            .list(&self.item_id)
            .await
            .map_err(|e| EngagementError::fetch(&e))?;

        let mut seen = HashSet::new();
        let author_ids: Vec<String> = records
            .iter()
            .filter(|r| seen.insert(r.author_id.as_str()))
            .map(|r| r.author_id.clone())
            .collect();

        let authors = if author_ids.is_empty() {
            Default::default()
        } else {
            match self.profiles.display_info_many(&author_ids).await {
                Ok(authors) => authors,
                Err(error) => {
                    warn!(item_id = %self.item_id, error = %error, "Author lookup failed");
                    Default::default()
                }
            }
        };

        let mut resolved: Vec<ResolvedComment> = records
            .into_iter()
            .map(|record| {
                let author = authors.get(&record.author_id);
                self.resolve(record, author)
            })
            .collect();
        resolved.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(resolved)
    }

    fn resolve(&self, record: CommentRecord, author: Option<&ProfileSummary>) -> ResolvedComment {
        let author_name = author.map_or_else(
            || self.config.unknown_author_label.clone(),
            |a| a.name.clone(),
        );
        let author_avatar = author
            .and_then(|a| a.avatar.clone())
            .unwrap_or_else(|| self.config.default_avatar.clone());

        ResolvedComment {
            id: record.id,
            author_id: record.author_id,
            author_name,
            author_avatar,
            body: record.body,
            created_at: record.created_at,
        }
    }

    async fn report(&self, error: EngagementError) -> EngagementResult<Outcome> {
        self.listener.error_reported(error.clone()).await;
        Err(error)
    }
}
