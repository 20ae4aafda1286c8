use crate::entities::{patient_entity, user_address_entity, user_entity};
use crate::utils::id_card::age_from_id_card;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WxLoginRequest {
    /// wx.login 返回的 code
    pub code: String,
    pub nick_name: Option<String>,
    pub avatar_url: Option<String>,
    pub gender: Option<i32>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,
    /// 首次登录时绑定推荐人
    pub promoter_code: Option<String>,
}

/// 对外暴露的用户信息（不含 session_key / 管理员密码）
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub user_id: String,
    pub open_id: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub gender: i32,
    pub phone: Option<String>,
    pub country: String,
    pub province: String,
    pub city: String,
    pub language: String,
    pub is_admin: bool,
    pub admin_level: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserInfo {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            open_id: m.open_id,
            nick_name: m.nick_name,
            avatar_url: m.avatar_url,
            gender: m.gender,
            phone: m.phone,
            country: m.country,
            province: m.province,
            city: m.city,
            language: m.language,
            is_admin: m.is_admin,
            admin_level: m.admin_level,
            last_login_at: m.last_login_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user_info: UserInfo,
    pub is_new_user: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfoRequest {
    pub nick_name: Option<String>,
    pub avatar_url: Option<String>,
    pub gender: Option<i32>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BindPhoneRequest {
    #[schema(example = "13812345678")]
    pub phone: String,
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    /// 更新时必填
    pub id: Option<i64>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddressResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub province: String,
    pub city: String,
    pub district: String,
    pub address: String,
    pub full_address: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user_address_entity::Model> for AddressResponse {
    fn from(m: user_address_entity::Model) -> Self {
        let full_address = format!("{}{}{}{}", m.province, m.city, m.district, m.address);
        Self {
            id: m.id,
            name: m.name,
            phone: m.phone,
            province: m.province,
            city: m.city,
            district: m.district,
            address: m.address,
            full_address,
            is_default: m.is_default,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    pub id: Option<i64>,
    pub name: String,
    pub id_card: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: i32,
    pub birthday: Option<String>,
    pub relation: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: i64,
    pub name: String,
    pub id_card: Option<String>,
    pub phone: Option<String>,
    pub gender: i32,
    pub birthday: Option<String>,
    pub relation: Option<String>,
    pub age: i32,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl PatientResponse {
    pub fn from_model(m: patient_entity::Model, today: NaiveDate) -> Self {
        let age = m
            .id_card
            .as_deref()
            .map(|card| age_from_id_card(card, today))
            .unwrap_or(0);
        Self {
            id: m.id,
            name: m.name,
            id_card: m.id_card,
            phone: m.phone,
            gender: m.gender,
            birthday: m.birthday,
            relation: m.relation,
            age,
            is_default: m.is_default,
            created_at: m.created_at,
        }
    }
}
