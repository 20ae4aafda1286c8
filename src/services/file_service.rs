use crate::database::DbPool;
use crate::entities::file_entity as files;
use crate::error::{AppError, AppResult};
use crate::models::{FileItem, FileListQuery, FilePermissionResponse, UploadFileRequest};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

const STATUS_ACTIVE: i32 = 1;
const STATUS_DELETED: i32 = 0;
pub const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;
const DEFAULT_LIST_LIMIT: u64 = 20;
const MAX_LIST_LIMIT: u64 = 100;

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
];

pub fn is_allowed_mime(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// image / document / other
pub fn file_type_of(mime_type: &str) -> &'static str {
    if mime_type.starts_with("image/") {
        "image"
    } else if mime_type.starts_with("application/") || mime_type.starts_with("text/") {
        "document"
    } else {
        "other"
    }
}

/// 存储文件名：时间戳 + 随机串 + 原扩展名
fn storage_name(original: &str) -> String {
    let ext = original
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default();
    format!(
        "{}_{}{ext}",
        Utc::now().timestamp_millis(),
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    )
}

#[derive(Clone)]
pub struct FileService {
    pool: DbPool,
}

impl FileService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 记录上传文件的元数据
    pub async fn upload(&self, user_id: &str, req: UploadFileRequest) -> AppResult<FileItem> {
        let original_name = req.file_name.trim();
        if original_name.is_empty() || req.file_url.trim().is_empty() {
            return Err(AppError::ValidationError("文件名和文件地址不能为空".into()));
        }
        let mime_type = req.mime_type.trim().to_lowercase();
        if !is_allowed_mime(&mime_type) {
            return Err(AppError::ValidationError("不支持的文件类型".into()));
        }
        if req.file_size <= 0 || req.file_size > MAX_FILE_SIZE {
            return Err(AppError::ValidationError("文件大小不能超过10MB".into()));
        }

        let now = Utc::now();
        let file_name = storage_name(original_name);
        let saved = files::ActiveModel {
            file_path: Set(format!("uploads/{user_id}/{file_name}")),
            file_name: Set(file_name),
            original_name: Set(original_name.to_string()),
            file_url: Set(req.file_url.trim().to_string()),
            file_size: Set(req.file_size),
            file_type: Set(file_type_of(&mime_type).to_string()),
            mime_type: Set(mime_type),
            category: Set(req.category.filter(|c| !c.is_empty())),
            description: Set(req.description),
            user_id: Set(user_id.to_string()),
            is_public: Set(false),
            status: Set(STATUS_ACTIVE),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("File {} uploaded by {user_id}", saved.id);
        Ok(saved.into())
    }

    pub async fn list(&self, user_id: &str, query: &FileListQuery) -> AppResult<Vec<FileItem>> {
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT);
        let mut select = files::Entity::find()
            .filter(files::Column::UserId.eq(user_id))
            .filter(files::Column::Status.eq(STATUS_ACTIVE));
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            select = select.filter(files::Column::Category.eq(category));
        }
        let rows = select
            .order_by_desc(files::Column::CreatedAt)
            .limit(limit)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_own(&self, user_id: &str, file_id: i64) -> AppResult<files::Model> {
        files::Entity::find_by_id(file_id)
            .filter(files::Column::UserId.eq(user_id))
            .filter(files::Column::Status.eq(STATUS_ACTIVE))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("文件不存在".into()))
    }

    pub async fn delete(&self, user_id: &str, file_id: i64) -> AppResult<()> {
        let file = self.find_own(user_id, file_id).await?;
        files::Entity::update_many()
            .col_expr(files::Column::Status, Expr::value(STATUS_DELETED))
            .col_expr(files::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(files::Column::Id.eq(file.id))
            .exec(self.pool.as_ref())
            .await?;
        log::info!("File {file_id} deleted by {user_id}");
        Ok(())
    }

    pub async fn set_permission(
        &self,
        user_id: &str,
        file_id: i64,
        is_public: bool,
    ) -> AppResult<FilePermissionResponse> {
        let file = self.find_own(user_id, file_id).await?;
        let mut active: files::ActiveModel = file.into();
        active.is_public = Set(is_public);
        active.updated_at = Set(Utc::now());
        let saved = active.update(self.pool.as_ref()).await?;
        Ok(FilePermissionResponse {
            file_id: saved.id,
            is_public: saved.is_public,
        })
    }

    pub async fn get_permission(
        &self,
        user_id: &str,
        file_id: i64,
    ) -> AppResult<FilePermissionResponse> {
        let file = self.find_own(user_id, file_id).await?;
        Ok(FilePermissionResponse {
            file_id: file.id,
            is_public: file.is_public,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::IntoPool;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn upload_req(mime: &str, size: i64) -> UploadFileRequest {
        UploadFileRequest {
            file_name: "报告.PDF".into(),
            file_url: "https://cdn.example.com/a.pdf".into(),
            file_size: size,
            mime_type: mime.into(),
            category: None,
            description: None,
        }
    }

    #[test]
    fn test_file_type_of() {
        assert_eq!(file_type_of("image/png"), "image");
        assert_eq!(file_type_of("application/pdf"), "document");
        assert_eq!(file_type_of("video/mp4"), "other");
    }

    #[test]
    fn test_storage_name_keeps_extension() {
        let name = storage_name("报告.PDF");
        assert!(name.ends_with(".pdf"));
        assert!(!storage_name("noext").contains('.'));
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_mime_and_size() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let svc = FileService::new(db);
        assert!(matches!(
            svc.upload("u1", upload_req("application/x-msdownload", 100)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            svc.upload("u1", upload_req("application/pdf", MAX_FILE_SIZE + 1))
                .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<files::Model>::new()])
            .into_pool();
        let err = FileService::new(db).delete("u2", 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
