use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户表
/// - user_id: 24 位十六进制业务ID，对外暴露与 JWT sub 均使用它
/// - is_admin / admin_level / parent_admin_id 组成两级管理员体系（2=超管，1=子管理员）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub user_id: String,
    #[sea_orm(unique)]
    pub open_id: String,
    pub union_id: Option<String>,
    pub nick_name: String,
    pub avatar_url: String,
    pub gender: i32,
    pub phone: Option<String>,
    pub country: String,
    pub province: String,
    pub city: String,
    pub language: String,
    pub session_key: Option<String>,
    pub is_admin: bool,
    pub admin_level: i32,
    pub parent_admin_id: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// 管理员级别
pub const ADMIN_LEVEL_SUB: i32 = 1;
pub const ADMIN_LEVEL_SUPER: i32 = 2;

impl Model {
    pub fn is_super_admin(&self) -> bool {
        self.is_admin && self.admin_level >= ADMIN_LEVEL_SUPER
    }
}
