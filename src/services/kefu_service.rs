use crate::database::DbPool;
use crate::entities::{faq_entity as faqs, kefu_message_entity as kefu_messages};
use crate::error::{AppError, AppResult};
use crate::models::{
    FaqItem, FaqQuery, PaginatedResponse, Pagination, SendKefuMessageRequest,
    SendKefuMessageResponse,
};
use crate::services::SseBroadcaster;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

const FAQ_ENABLED: i32 = 1;
/// 客服消息：0 未回复
const KEFU_UNREPLIED: i32 = 0;
/// 1 文本 / 2 含图片
const MESSAGE_TEXT: i32 = 1;
const MESSAGE_IMAGE: i32 = 2;
const MAX_CONTENT_CHARS: usize = 1000;
const MAX_IMAGES: usize = 9;

#[derive(Clone)]
pub struct KefuService {
    pool: DbPool,
    sse: SseBroadcaster,
}

impl KefuService {
    pub fn new(pool: DbPool, sse: SseBroadcaster) -> Self {
        Self { pool, sse }
    }

    pub async fn send_message(
        &self,
        user_id: &str,
        req: SendKefuMessageRequest,
    ) -> AppResult<SendKefuMessageResponse> {
        let content = req.content.trim();
        if content.is_empty() && req.images.is_empty() {
            return Err(AppError::ValidationError("消息内容不能为空".into()));
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(AppError::ValidationError("消息内容过长".into()));
        }
        if req.images.len() > MAX_IMAGES {
            return Err(AppError::ValidationError("图片最多9张".into()));
        }

        let now = Utc::now();
        let (message_type, images) = if req.images.is_empty() {
            (MESSAGE_TEXT, None)
        } else {
            (MESSAGE_IMAGE, Some(serde_json::to_string(&req.images)?))
        };

        let saved = kefu_messages::ActiveModel {
            user_id: Set(user_id.to_string()),
            user_name: Set(req.user_name),
            user_avatar: Set(req.user_avatar),
            message_type: Set(message_type),
            content: Set(content.to_string()),
            images: Set(images),
            status: Set(KEFU_UNREPLIED),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Kefu message {} received from {user_id}", saved.id);
        self.sse.notify("新客服消息", &saved.content);

        Ok(SendKefuMessageResponse {
            message_id: saved.id,
            message: "发送成功".into(),
        })
    }

    pub async fn list_faqs(&self, query: &FaqQuery) -> AppResult<PaginatedResponse<FaqItem>> {
        let pagination = Pagination::new(query.page, query.page_size, 20, 50);
        let mut select = faqs::Entity::find().filter(faqs::Column::Status.eq(FAQ_ENABLED));
        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            select = select.filter(faqs::Column::Category.eq(category));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_asc(faqs::Column::Sort)
            .order_by_asc(faqs::Column::Id)
            .limit(pagination.limit())
            .offset(pagination.offset())
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            pagination,
            total,
        ))
    }

    /// FAQ 详情，浏览次数 +1
    pub async fn faq_detail(&self, id: i64) -> AppResult<FaqItem> {
        let faq = faqs::Entity::find_by_id(id)
            .filter(faqs::Column::Status.eq(FAQ_ENABLED))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("问题不存在".into()))?;

        faqs::Entity::update_many()
            .col_expr(
                faqs::Column::ViewCount,
                Expr::col(faqs::Column::ViewCount).add(1),
            )
            .filter(faqs::Column::Id.eq(faq.id))
            .exec(self.pool.as_ref())
            .await?;

        let mut item = FaqItem::from(faq);
        item.view_count += 1;
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use tokio::sync::watch;

    fn service(db: DbPool) -> KefuService {
        let (_tx, rx) = watch::channel(false);
        let (sse, _handle) = SseBroadcaster::spawn(4, rx);
        KefuService::new(db, sse)
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let err = service(db)
            .send_message(
                "u1",
                SendKefuMessageRequest {
                    content: "   ".into(),
                    images: vec![],
                    user_name: None,
                    user_avatar: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_faq_detail_increments_view_count() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![faqs::Model {
                id: 5,
                question: "如何预约?".into(),
                answer: "在首页选择服务".into(),
                category: "order".into(),
                sort: 1,
                status: FAQ_ENABLED,
                view_count: 9,
                created_at: now,
                updated_at: now,
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_pool();

        let item = service(db.clone()).faq_detail(5).await.unwrap();
        assert_eq!(item.view_count, 10);
        let log = transaction_log(db);
        assert!(log.contains("UPDATE `faqs` SET `view_count`"));
    }
}
