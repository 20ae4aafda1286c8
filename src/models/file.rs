use crate::entities::file_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    #[schema(example = "report.pdf")]
    pub file_name: String,
    pub file_url: String,
    pub file_size: i64,
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileItem {
    pub id: i64,
    pub file_name: String,
    pub original_name: String,
    pub file_url: String,
    pub file_size: i64,
    pub file_type: String,
    pub mime_type: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

impl From<file_entity::Model> for FileItem {
    fn from(m: file_entity::Model) -> Self {
        Self {
            id: m.id,
            file_name: m.file_name,
            original_name: m.original_name,
            file_url: m.file_url,
            file_size: m.file_size,
            file_type: m.file_type,
            mime_type: m.mime_type,
            category: m.category,
            description: m.description,
            is_public: m.is_public,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FileListQuery {
    pub category: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileIdQuery {
    pub file_id: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePermissionRequest {
    pub file_id: i64,
    pub is_public: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePermissionResponse {
    pub file_id: i64,
    pub is_public: bool,
}
