use crate::entities::{
    consultation_entity, consultation_message_entity, consultation_notification_entity,
    faq_entity,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendKefuMessageRequest {
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub user_name: Option<String>,
    pub user_avatar: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendKefuMessageResponse {
    pub message_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaqQuery {
    pub category: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaqItem {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub view_count: i32,
}

impl From<faq_entity::Model> for FaqItem {
    fn from(m: faq_entity::Model) -> Self {
        Self {
            id: m.id,
            question: m.question,
            answer: m.answer,
            category: m.category,
            view_count: m.view_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationResponse {
    pub id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_phone: Option<String>,
    #[schema(value_type = String)]
    pub status: String,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<consultation_entity::Model> for ConsultationResponse {
    fn from(m: consultation_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            user_name: m.user_name,
            user_phone: m.user_phone,
            status: m.status.as_str().to_string(),
            last_message_at: m.last_message_at,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsultationMessageRequest {
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationMessageItem {
    pub id: i64,
    pub consultation_id: i64,
    pub sender_type: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<consultation_message_entity::Model> for ConsultationMessageItem {
    fn from(m: consultation_message_entity::Model) -> Self {
        Self {
            id: m.id,
            consultation_id: m.consultation_id,
            sender_type: m.sender_type.as_str().to_string(),
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationNotificationItem {
    pub id: i64,
    pub consultation_id: i64,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub content: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<consultation_notification_entity::Model> for ConsultationNotificationItem {
    fn from(m: consultation_notification_entity::Model) -> Self {
        Self {
            id: m.id,
            consultation_id: m.consultation_id,
            notification_type: m.notification_type,
            title: m.title,
            content: m.content,
            is_read: m.is_read,
            created_at: m.created_at,
        }
    }
}
