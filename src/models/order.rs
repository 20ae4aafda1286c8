use crate::entities::order_entity;
use chrono::{DateTime, Utc};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    pub service_id: i64,
    pub patient_id: i64,
    pub address_id: i64,
    #[schema(example = "2025-06-11")]
    pub appointment_date: String,
    #[schema(example = "08:00")]
    pub appointment_time: String,
    pub disease_info: Option<String>,
    /// "1" 表示需要如厕协助
    pub need_toilet_assist: Option<String>,
    pub quantity: Option<i32>,
    #[schema(value_type = Object)]
    pub form_data: Option<serde_json::Value>,
    pub remark: Option<String>,
    /// 显式指定的推荐人 user_id
    pub referrer_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    pub order_id: i64,
    pub order_no: String,
    pub total_amount: f64,
    pub pay_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayOrderRequest {
    #[schema(example = "wechat")]
    pub pay_method: Option<String>,
}

/// 小程序 wx.requestPayment 所需参数
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayParams {
    pub time_stamp: String,
    pub nonce_str: String,
    pub package: String,
    pub sign_type: String,
    pub pay_sign: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayConfirmRequest {
    pub transaction_id: Option<String>,
    pub pay_method: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundOrderRequest {
    pub refund_amount: f64,
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub status: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailQuery {
    pub order_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TimeSlotsRequest {
    #[schema(example = "2025-06-11")]
    pub date: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotsResponse {
    pub date: String,
    pub time_slots: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub order_no: String,
    pub user_id: String,
    pub service_id: i64,
    pub patient_id: i64,
    pub address_id: i64,
    pub service_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub disease_info: Option<String>,
    pub need_toilet_assist: i32,
    pub price: f64,
    pub quantity: i32,
    pub total_amount: f64,
    #[schema(value_type = Object)]
    pub form_data: serde_json::Value,
    pub status: i32,
    pub status_text: String,
    pub pay_status: i32,
    pub pay_deadline: Option<DateTime<Utc>>,
    pub pay_time: Option<DateTime<Utc>>,
    pub pay_method: Option<String>,
    pub transaction_id: Option<String>,
    pub refund_status: i32,
    pub refund_amount: f64,
    pub refund_reason: Option<String>,
    pub refund_time: Option<DateTime<Utc>>,
    pub remark: Option<String>,
    pub referrer_id: Option<String>,
    pub commission: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<order_entity::Model> for OrderResponse {
    fn from(m: order_entity::Model) -> Self {
        // 表单数据按 JSON 存储，历史脏数据按原文返回
        let form_data = m
            .form_data
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| {
                serde_json::from_str(s).unwrap_or_else(|_| serde_json::Value::String(s.into()))
            })
            .unwrap_or(serde_json::Value::Null);

        Self {
            id: m.id,
            order_no: m.order_no,
            user_id: m.user_id,
            service_id: m.service_id,
            patient_id: m.patient_id,
            address_id: m.address_id,
            service_name: m.service_name,
            appointment_date: m.appointment_date,
            appointment_time: m.appointment_time,
            disease_info: m.disease_info,
            need_toilet_assist: m.need_toilet_assist,
            price: m.price,
            quantity: m.quantity,
            total_amount: m.total_amount,
            form_data,
            status: m.status.to_value(),
            status_text: m.status.text().to_string(),
            pay_status: m.pay_status.to_value(),
            pay_deadline: m.pay_deadline,
            pay_time: m.pay_time,
            pay_method: m.pay_method,
            transaction_id: m.transaction_id,
            refund_status: m.refund_status.to_value(),
            refund_amount: m.refund_amount,
            refund_reason: m.refund_reason,
            refund_time: m.refund_time,
            remark: m.remark,
            referrer_id: m.referrer_id,
            commission: m.commission,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredCheckResponse {
    pub message: String,
    pub expired_count: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpiredCountResponse {
    pub expired_count: u64,
}
