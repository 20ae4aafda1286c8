use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 平台配置键值对
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "configs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub config_key: String,
    #[sea_orm(column_type = "Text")]
    pub config_value: String,
    pub description: Option<String>,
    /// string / number / boolean / json
    pub value_type: Option<String>,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
