//! Post entity (poems, stories and opinions shown in the feed).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of content a post carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    #[sea_orm(string_value = "poem")]
    Poem,
    #[sea_orm(string_value = "story")]
    Story,
    #[sea_orm(string_value = "opinion")]
    Opinion,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Author profile ID
    #[sea_orm(indexed)]
    pub author_id: String,

    pub kind: PostKind,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// Denormalized number of rows in `likes` for this post
    #[sea_orm(default_value = 0)]
    pub like_count: i32,

    /// Denormalized number of rows in `dislikes` for this post
    #[sea_orm(default_value = 0)]
    pub dislike_count: i32,

    /// Denormalized number of rows in `comments` for this post
    #[sea_orm(default_value = 0)]
    pub comment_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::AuthorId",
        to = "super::profile::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
