//! Domain types shared by the engagement managers.

use chrono::{DateTime, Utc};
use inkfeed_db::entities::post::{self, PostKind};
use serde::Serialize;

/// Number of characters kept when deriving a card excerpt from post content.
const EXCERPT_CHARS: usize = 200;

/// Kind of content an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Poem,
    Story,
    Opinion,
}

impl From<PostKind> for ContentKind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::Poem => Self::Poem,
            PostKind::Story => Self::Story,
            PostKind::Opinion => Self::Opinion,
        }
    }
}

/// A unit of content shown as a card in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    pub excerpt: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
    pub dislike_count: u64,
    pub comment_count: u64,
}

impl From<post::Model> for ContentItem {
    fn from(model: post::Model) -> Self {
        Self {
            excerpt: model.content.chars().take(EXCERPT_CHARS).collect(),
            id: model.id,
            kind: model.kind.into(),
            title: model.title,
            author_id: model.author_id,
            created_at: model.created_at.with_timezone(&Utc),
            like_count: counter(model.like_count),
            dislike_count: counter(model.dislike_count),
            comment_count: counter(model.comment_count),
        }
    }
}

/// Stored counters are signed; a negative value is treated as zero.
fn counter(value: i32) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// A comment ready for display, with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedComment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub author_avatar: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Result of an engagement action that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action ran and its effects settled.
    Committed,
    /// The action was deliberately not run.
    Skipped(SkipReason),
}

/// Why an action was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The same control already has a request outstanding.
    InFlight,
    /// The comment body was empty after trimming.
    EmptyBody,
    /// A newer request made this result irrelevant.
    Superseded,
}
