//! Engagement managers and the persistence gateway they talk to.

#![allow(missing_docs)]

pub mod card;
pub mod comment_thread;
pub mod database_gateway;
pub mod follow;
pub mod gateway;
pub mod listener;
pub mod reaction;

#[cfg(test)]
mod test_support;

pub use card::{ContentCard, ViewState};
pub use comment_thread::{CommentThread, ThreadPhase, ThreadView};
pub use database_gateway::{DatabaseGateway, NewComment};
pub use follow::{FollowManager, FollowView};
pub use gateway::{
    CommentRecord, CommentStore, CommentStoreService, FollowRelationship, FollowStore,
    FollowStoreService, Gateway, ProfileDirectory, ProfileDirectoryService, ProfileSummary,
    ReactionFacts, ReactionStore, ReactionStoreService,
};
pub use listener::{
    ChannelListener, EngagementEvent, EngagementListener, ListenerService, NoOpListener, Notice,
};
pub use reaction::{
    CommitReport, ReactionController, ReactionEvent, ReactionPlan, ReactionState, ReactionView,
    RemoteStep,
};
