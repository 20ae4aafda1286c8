use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 上传文件元数据（对象本身存放在对象存储）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "files")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub file_name: String,
    pub original_name: String,
    pub file_path: String,
    pub file_url: String,
    pub file_size: i64,
    /// image / document / other
    pub file_type: String,
    pub mime_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub user_id: String,
    pub is_public: bool,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
