use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 服务项目（可下单的商品），status 1 上架 / 0 下架
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "service_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub category: String,
    pub price: f64,
    pub original_price: f64,
    pub image_url: Option<String>,
    /// JSON 数组
    #[sea_orm(column_type = "Text", nullable)]
    pub detail_images: Option<String>,
    /// JSON 表单配置
    #[sea_orm(column_type = "Text", nullable)]
    pub form_config: Option<String>,
    pub status: i32,
    pub sort: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
