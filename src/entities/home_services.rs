use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 首页服务入口，service_item_id 指向 service_items 供前端跳转
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "home_services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub service_item_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    pub icon: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub sort: i32,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
