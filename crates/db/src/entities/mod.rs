//! `SeaORM` entities.

#![allow(missing_docs)]

pub mod comment;
pub mod dislike;
pub mod follow;
pub mod like;
pub mod post;
pub mod profile;

pub use comment::Entity as Comment;
pub use dislike::Entity as Dislike;
pub use follow::Entity as Follow;
pub use like::Entity as Like;
pub use post::Entity as Post;
pub use profile::Entity as Profile;
