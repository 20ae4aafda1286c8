use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 就诊人，gender 0 未知 / 1 男 / 2 女
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "patients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub id_card: Option<String>,
    pub phone: Option<String>,
    pub gender: i32,
    pub birthday: Option<String>,
    /// 与用户关系：本人、父亲、母亲等
    pub relation: Option<String>,
    pub is_default: bool,
    pub status: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
