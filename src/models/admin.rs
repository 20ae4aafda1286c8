use crate::entities::{admin_login_log_entity, user_entity};
use crate::models::UserInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub user_id: String,
    pub username: Option<String>,
    pub nick_name: String,
    pub avatar_url: String,
    pub admin_level: i32,
    pub parent_admin_id: Option<String>,
}

impl From<&user_entity::Model> for AdminProfile {
    fn from(m: &user_entity::Model) -> Self {
        Self {
            user_id: m.user_id.clone(),
            username: m.admin_username.clone(),
            nick_name: m.nick_name.clone(),
            avatar_url: m.avatar_url.clone(),
            admin_level: m.admin_level,
            parent_admin_id: m.parent_admin_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user_info: AdminProfile,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminPageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub status: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOrderItem {
    pub id: i64,
    pub order_no: String,
    pub user_id: String,
    pub user_nick_name: String,
    pub service_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub total_amount: f64,
    pub status: i32,
    pub status_text: String,
    pub pay_status: i32,
    pub refund_status: i32,
    pub refund_amount: f64,
    pub referrer_id: Option<String>,
    pub commission: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub total_orders: u64,
    pub today_orders: u64,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub unpaid_amount: f64,
    pub refund_amount: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminRequest {
    pub user_id: String,
    /// 1 子管理员 / 2 超级管理员
    pub admin_level: i32,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveAdminRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub is_admin: bool,
    pub admin_level: i32,
    pub is_super_admin: bool,
    pub user_info: UserInfo,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminItem {
    pub user_id: String,
    pub username: Option<String>,
    pub nick_name: String,
    pub avatar_url: String,
    pub phone: Option<String>,
    pub admin_level: i32,
    pub parent_admin_id: Option<String>,
    pub admin_created_at: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    /// 以该管理员为推荐人的订单总额
    pub total_amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginLogItem {
    pub id: i64,
    pub username: String,
    pub login_ip: Option<String>,
    pub user_agent: Option<String>,
    pub status: i32,
    pub created_at: DateTime<Utc>,
}

impl From<admin_login_log_entity::Model> for LoginLogItem {
    fn from(m: admin_login_log_entity::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            login_ip: m.login_ip,
            user_agent: m.user_agent,
            status: m.status,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsultationReplyRequest {
    pub content: String,
}
