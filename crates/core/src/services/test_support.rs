//! In-memory gateway for manager tests.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkfeed_common::{AppError, AppResult};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::services::gateway::{
    CommentRecord, CommentStore, FollowStore, ProfileDirectory, ProfileSummary, ReactionFacts,
    ReactionStore,
};

type Pair = (String, String);

#[derive(Default)]
struct MemoryState {
    likes: HashSet<Pair>,
    dislikes: HashSet<Pair>,
    comments: Vec<CommentRecord>,
    profiles: HashMap<String, ProfileSummary>,
    follows: HashSet<Pair>,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
    next_comment: u32,
}

/// Gateway over plain collections, with failure injection and a call log.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
    write_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    list_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    read_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

fn pair(a: &str, b: &str) -> Pair {
    (a.to_string(), b.to_string())
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of `op` fail with a database error.
    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.state.lock().unwrap().failing.remove(op);
    }

    /// Calls made so far, as `op` or `op:arg`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(':').next() == Some(op))
            .count()
    }

    /// The next write waits until the returned sender fires or is dropped,
    /// before logging or failing.
    pub fn hold_next_write(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.write_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// The next comment listing snapshots its rows, then waits until the
    /// returned sender fires.
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// The next `facts` or follower `count` read snapshots its answer, then
    /// waits until the returned sender fires.
    pub fn hold_next_read(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.read_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn seed_like(&self, viewer: &str, item: &str) {
        self.state.lock().unwrap().likes.insert(pair(viewer, item));
    }

    pub fn seed_dislike(&self, viewer: &str, item: &str) {
        self.state.lock().unwrap().dislikes.insert(pair(viewer, item));
    }

    pub fn seed_follow(&self, follower: &str, target: &str) {
        self.state.lock().unwrap().follows.insert(pair(follower, target));
    }

    pub fn seed_profile(&self, id: &str, name: &str, avatar: Option<&str>) {
        self.state.lock().unwrap().profiles.insert(
            id.to_string(),
            ProfileSummary {
                name: name.to_string(),
                avatar: avatar.map(ToString::to_string),
            },
        );
    }

    pub fn seed_comment(&self, id: &str, item: &str, author: &str, body: &str, at: DateTime<Utc>) {
        self.state.lock().unwrap().comments.push(CommentRecord {
            id: id.to_string(),
            item_id: item.to_string(),
            author_id: author.to_string(),
            body: body.to_string(),
            created_at: at,
        });
    }

    pub fn has_like(&self, viewer: &str, item: &str) -> bool {
        self.state.lock().unwrap().likes.contains(&pair(viewer, item))
    }

    pub fn has_dislike(&self, viewer: &str, item: &str) -> bool {
        self.state.lock().unwrap().dislikes.contains(&pair(viewer, item))
    }

    pub fn has_follow(&self, follower: &str, target: &str) -> bool {
        self.state.lock().unwrap().follows.contains(&pair(follower, target))
    }

    pub fn comment_count(&self, item: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .comments
            .iter()
            .filter(|c| c.item_id == item)
            .count()
    }

    /// Log the call and fail it if injected.
    fn enter(&self, op: &'static str, call: String) -> AppResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(op) {
            return Err(AppError::Database(format!("{op} failed")));
        }
        Ok(())
    }

    async fn pass_write_gate(&self) {
        Self::pass_gate(&self.write_gates).await;
    }

    async fn pass_gate(gates: &Mutex<VecDeque<oneshot::Receiver<()>>>) {
        let gate = gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }
}

#[async_trait]
impl ReactionStore for MemoryGateway {
    async fn set_like(&self, viewer_id: &str, item_id: &str, present: bool) -> AppResult<()> {
        self.pass_write_gate().await;
        self.enter("set_like", format!("set_like:{present}"))?;
        let mut state = self.state.lock().unwrap();
        if present {
            state.likes.insert(pair(viewer_id, item_id));
        } else {
            state.likes.remove(&pair(viewer_id, item_id));
        }
        Ok(())
    }

    async fn set_dislike(&self, viewer_id: &str, item_id: &str, present: bool) -> AppResult<()> {
        self.pass_write_gate().await;
        self.enter("set_dislike", format!("set_dislike:{present}"))?;
        let mut state = self.state.lock().unwrap();
        if present {
            state.dislikes.insert(pair(viewer_id, item_id));
        } else {
            state.dislikes.remove(&pair(viewer_id, item_id));
        }
        Ok(())
    }

    async fn facts(&self, viewer_id: &str, item_id: &str) -> AppResult<ReactionFacts> {
        self.enter("facts", "facts".to_string())?;
        let facts = {
            let state = self.state.lock().unwrap();
            let key = pair(viewer_id, item_id);
            ReactionFacts {
                liked: state.likes.contains(&key),
                disliked: state.dislikes.contains(&key),
            }
        };
        Self::pass_gate(&self.read_gates).await;
        Ok(facts)
    }

    async fn count_likes(&self, item_id: &str) -> AppResult<u64> {
        self.enter("count_likes", "count_likes".to_string())?;
        let state = self.state.lock().unwrap();
        Ok(state.likes.iter().filter(|(_, item)| item == item_id).count() as u64)
    }
}

#[async_trait]
impl CommentStore for MemoryGateway {
    async fn list(&self, item_id: &str) -> AppResult<Vec<CommentRecord>> {
        self.enter("list", "list".to_string())?;
        let mut rows: Vec<CommentRecord> = {
            let state = self.state.lock().unwrap();
            state
                .comments
                .iter()
                .filter(|c| c.item_id == item_id)
                .cloned()
                .collect()
        };
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Self::pass_gate(&self.list_gates).await;
        Ok(rows)
    }

    async fn create(&self, item_id: &str, viewer_id: &str, body: &str) -> AppResult<()> {
        self.pass_write_gate().await;
        self.enter("create_comment", format!("create_comment:{body}"))?;
        let mut state = self.state.lock().unwrap();
        state.next_comment += 1;
        let id = format!("new{:04}", state.next_comment);
        state.comments.push(CommentRecord {
            id,
            item_id: item_id.to_string(),
            author_id: viewer_id.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl ProfileDirectory for MemoryGateway {
    async fn display_info_many(
        &self,
        ids: &[String],
    ) -> AppResult<HashMap<String, ProfileSummary>> {
        self.enter("display_info_many", format!("display_info_many:{}", ids.len()))?;
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.profiles.get(id).map(|p| (id.clone(), p.clone())))
            .collect())
    }
}

#[async_trait]
impl FollowStore for MemoryGateway {
    async fn exists(&self, follower_id: &str, target_id: &str) -> AppResult<bool> {
        self.enter("follow_exists", "follow_exists".to_string())?;
        Ok(self.has_follow(follower_id, target_id))
    }

    async fn count(&self, target_id: &str) -> AppResult<u64> {
        self.enter("follow_count", "follow_count".to_string())?;
        let count = {
            let state = self.state.lock().unwrap();
            state.follows.iter().filter(|(_, t)| t == target_id).count() as u64
        };
        Self::pass_gate(&self.read_gates).await;
        Ok(count)
    }

    async fn set(&self, follower_id: &str, target_id: &str, present: bool) -> AppResult<()> {
        self.pass_write_gate().await;
        self.enter("follow_set", format!("follow_set:{present}"))?;
        let mut state = self.state.lock().unwrap();
        if present {
            state.follows.insert(pair(follower_id, target_id));
        } else {
            state.follows.remove(&pair(follower_id, target_id));
        }
        Ok(())
    }
}
