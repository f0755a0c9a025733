//! Engagement synchronization core for inkfeed.
//!
//! Each content card owns three managers that keep a viewer's local view in
//! step with the store: a [`ReactionController`] for likes and dislikes, a
//! [`CommentThread`] for the lazily loaded comment list, and a
//! [`FollowManager`] for the author relationship. Changes are applied
//! optimistically, committed through the [`Gateway`] traits, and rolled back
//! or settled when the store answers. Errors and settled mutations are
//! reported to an [`EngagementListener`].

pub mod models;
pub mod services;

pub use models::{ContentItem, ContentKind, Outcome, ResolvedComment, SkipReason};
pub use services::*;
