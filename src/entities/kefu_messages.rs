use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 客服留言
/// - message_type: 1 用户消息 / 2 客服回复
/// - status: 0 未读 / 1 已读 / 2 已回复
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "kefu_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
    pub message_type: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub images: Option<String>,
    pub status: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub reply_content: Option<String>,
    pub reply_time: Option<DateTime<Utc>>,
    pub reply_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
