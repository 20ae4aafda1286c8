use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 管理员登录日志，status 1 成功 / 0 失败
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "admin_login_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub admin_user_id: Option<String>,
    pub username: String,
    pub login_ip: Option<String>,
    pub user_agent: Option<String>,
    pub status: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
