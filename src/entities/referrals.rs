use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 推荐关系，每个用户最多一条
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: String,
    /// 推荐人 user_id
    pub referrer_id: Option<String>,
    #[sea_orm(unique)]
    pub promoter_code: Option<String>,
    pub qr_code_url: Option<String>,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
