use crate::entities::{cashout_entity, commission_entity};
use chrono::{DateTime, Utc};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoterStats {
    pub total_income: f64,
    pub today_income: f64,
    pub month_income: f64,
    pub total_orders: u64,
    pub today_orders: u64,
    pub month_orders: u64,
    pub pending_amount: f64,
    pub settled_amount: f64,
    pub withdrawn_amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoterInfoResponse {
    pub user_id: String,
    pub promoter_code: String,
    pub formatted_code: String,
    pub qr_code_url: String,
    pub referrer_id: Option<String>,
    pub stats: PromoterStats,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub status: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionItem {
    pub id: i64,
    pub order_id: i64,
    pub order_no: String,
    pub amount: f64,
    pub rate: f64,
    pub status: i32,
    pub status_text: String,
    pub cashout_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<commission_entity::Model> for CommissionItem {
    fn from(m: commission_entity::Model) -> Self {
        Self {
            id: m.id,
            order_id: m.order_id,
            order_no: m.order_no,
            amount: m.amount,
            rate: m.rate,
            status: m.status.to_value(),
            status_text: m.status.text().to_string(),
            cashout_time: m.cashout_time,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashoutItem {
    pub id: i64,
    pub user_id: String,
    pub amount: f64,
    pub method: String,
    pub method_text: String,
    pub account: String,
    pub status: i32,
    pub status_text: String,
    pub remark: Option<String>,
    pub process_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<cashout_entity::Model> for CashoutItem {
    fn from(m: cashout_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            amount: m.amount,
            method: m.method.to_string(),
            method_text: m.method.text().to_string(),
            account: m.account,
            status: m.status.to_value(),
            status_text: m.status.text().to_string(),
            remark: m.remark,
            process_time: m.process_time,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PromoterCodeQuery {
    #[schema(example = "ABC123")]
    pub code: String,
}

/// 推广码持有人的公开信息
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PromoterPublicInfo {
    pub user_id: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub promoter_code: String,
    pub formatted_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindReferrerRequest {
    pub promoter_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BindReferrerResponse {
    pub referrer_id: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodesResponse {
    pub generated: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QrcodeResponse {
    pub qr_code_url: String,
    pub promoter_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralUserItem {
    pub user_id: String,
    pub nick_name: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralReportResponse {
    pub referrer: Option<ReferralUserItem>,
    pub referrals: Vec<ReferralUserItem>,
    pub commissions: Vec<CommissionItem>,
    pub total_commission: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralConfigResponse {
    pub commission_rate: f64,
    pub min_cashout: f64,
    pub rules: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyCashoutRequest {
    pub amount: Option<f64>,
    #[schema(example = "wechat")]
    pub method: Option<String>,
    pub account: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCashoutResponse {
    pub cashout_id: i64,
    pub amount: f64,
    pub method: String,
    pub status: i32,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleCommissionRequest {
    pub commission_ids: Option<Vec<i64>>,
    pub order_id: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettleCommissionResponse {
    pub settled: u64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CashoutReviewRequest {
    pub remark: Option<String>,
}
