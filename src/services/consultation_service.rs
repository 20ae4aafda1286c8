use crate::database::DbPool;
use crate::entities::{
    ConsultationStatus, SenderType, consultation_entity as consultations,
    consultation_message_entity as messages, consultation_notification_entity as notifications,
    user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{ConsultationMessageItem, ConsultationNotificationItem, ConsultationResponse};
use crate::services::{AdminScope, SseBroadcaster};
use chrono::Utc;
use sea_orm::sea_query::{ConditionalStatement, Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

const WELCOME_MESSAGE: &str = "您好，欢迎咨询！请描述您的问题，客服会尽快回复您。";
const NOTIFICATION_NEW_MESSAGE: &str = "new_message";
const NOTIFICATION_LIMIT: u64 = 50;
const MAX_MESSAGE_CHARS: usize = 2000;

fn validate_content(content: &str) -> AppResult<&str> {
    let content = content.trim();
    if content.is_empty() {
        return Err(AppError::ValidationError("消息内容不能为空".into()));
    }
    if content.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::ValidationError("消息内容过长".into()));
    }
    Ok(content)
}

async fn append_message<C: ConnectionTrait>(
    conn: &C,
    consultation_id: i64,
    sender: SenderType,
    content: &str,
) -> AppResult<messages::Model> {
    Ok(messages::ActiveModel {
        consultation_id: Set(consultation_id),
        sender_type: Set(sender),
        content: Set(content.to_string()),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?)
}

async fn notify_admins<C: ConnectionTrait>(
    conn: &C,
    consultation_id: i64,
    title: &str,
    content: &str,
) -> AppResult<()> {
    notifications::ActiveModel {
        consultation_id: Set(consultation_id),
        notification_type: Set(NOTIFICATION_NEW_MESSAGE.to_string()),
        title: Set(title.to_string()),
        content: Set(Some(content.to_string())),
        is_read: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// 切换会话状态并刷新最后消息时间
async fn touch<C: ConnectionTrait>(
    conn: &C,
    consultation_id: i64,
    status: ConsultationStatus,
) -> AppResult<()> {
    let now = Utc::now();
    consultations::Entity::update_many()
        .col_expr(consultations::Column::Status, Expr::value(status))
        .col_expr(consultations::Column::LastMessageAt, Expr::value(now))
        .col_expr(consultations::Column::UpdatedAt, Expr::value(now))
        .filter(consultations::Column::Id.eq(consultation_id))
        .exec(conn)
        .await?;
    Ok(())
}

#[derive(Clone)]
pub struct ConsultationService {
    pool: DbPool,
    sse: SseBroadcaster,
}

impl ConsultationService {
    pub fn new(pool: DbPool, sse: SseBroadcaster) -> Self {
        Self { pool, sse }
    }

    async fn find_own(&self, user_id: &str, id: i64) -> AppResult<consultations::Model> {
        consultations::Entity::find_by_id(id)
            .filter(consultations::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("咨询不存在".into()))
    }

    async fn find_scoped(&self, scope: &AdminScope, id: i64) -> AppResult<consultations::Model> {
        consultations::Entity::find_by_id(id)
            .filter(scope.user_condition(consultations::Column::UserId))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("咨询不存在".into()))
    }

    /// 返回未结束的会话，没有则新建并发送欢迎语
    pub async fn create(&self, user_id: &str) -> AppResult<ConsultationResponse> {
        let active = consultations::Entity::find()
            .filter(consultations::Column::UserId.eq(user_id))
            .filter(consultations::Column::Status.ne(ConsultationStatus::Closed))
            .order_by_desc(consultations::Column::Id)
            .one(self.pool.as_ref())
            .await?;
        if let Some(active) = active {
            return Ok(active.into());
        }

        let user = users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let consultation = consultations::ActiveModel {
            user_id: Set(user.user_id.clone()),
            user_name: Set(user.nick_name.clone()),
            user_phone: Set(user.phone.clone()),
            status: Set(ConsultationStatus::Waiting),
            last_message_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        append_message(&txn, consultation.id, SenderType::Admin, WELCOME_MESSAGE).await?;
        notify_admins(
            &txn,
            consultation.id,
            "新的咨询",
            &format!("{} 发起了在线咨询", user.nick_name),
        )
        .await?;
        txn.commit().await?;

        log::info!("Consultation {} created by {user_id}", consultation.id);
        self.sse.notify("新的咨询", &user.nick_name);
        Ok(consultation.into())
    }

    /// 用户发送消息，会话回到等待回复状态
    pub async fn send_user_message(
        &self,
        user_id: &str,
        id: i64,
        content: &str,
    ) -> AppResult<ConsultationMessageItem> {
        let content = validate_content(content)?;
        let consultation = self.find_own(user_id, id).await?;
        if consultation.status == ConsultationStatus::Closed {
            return Err(AppError::BusinessError("咨询已结束".into()));
        }

        let txn = self.pool.begin().await?;
        let message = append_message(&txn, consultation.id, SenderType::User, content).await?;
        touch(&txn, consultation.id, ConsultationStatus::Waiting).await?;
        notify_admins(&txn, consultation.id, "新消息", content).await?;
        txn.commit().await?;

        self.sse.notify("新消息", content);
        Ok(message.into())
    }

    /// 管理员回复，会话进入咨询中
    pub async fn admin_reply(
        &self,
        scope: &AdminScope,
        id: i64,
        content: &str,
    ) -> AppResult<ConsultationMessageItem> {
        let content = validate_content(content)?;
        let consultation = self.find_scoped(scope, id).await?;
        if consultation.status == ConsultationStatus::Closed {
            return Err(AppError::BusinessError("咨询已结束".into()));
        }

        let txn = self.pool.begin().await?;
        let message = append_message(&txn, consultation.id, SenderType::Admin, content).await?;
        touch(&txn, consultation.id, ConsultationStatus::Chatting).await?;
        txn.commit().await?;

        Ok(message.into())
    }

    /// 拉取消息并把对方发来的标记为已读
    async fn read_messages(
        &self,
        consultation_id: i64,
        reader: SenderType,
    ) -> AppResult<Vec<ConsultationMessageItem>> {
        let other = match reader {
            SenderType::User => SenderType::Admin,
            SenderType::Admin => SenderType::User,
        };
        messages::Entity::update_many()
            .col_expr(messages::Column::IsRead, Expr::value(true))
            .filter(messages::Column::ConsultationId.eq(consultation_id))
            .filter(messages::Column::SenderType.eq(other))
            .filter(messages::Column::IsRead.eq(false))
            .exec(self.pool.as_ref())
            .await?;

        let rows = messages::Entity::find()
            .filter(messages::Column::ConsultationId.eq(consultation_id))
            .order_by_asc(messages::Column::CreatedAt)
            .order_by_asc(messages::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn user_messages(
        &self,
        user_id: &str,
        id: i64,
    ) -> AppResult<Vec<ConsultationMessageItem>> {
        let consultation = self.find_own(user_id, id).await?;
        self.read_messages(consultation.id, SenderType::User).await
    }

    pub async fn admin_messages(
        &self,
        scope: &AdminScope,
        id: i64,
    ) -> AppResult<Vec<ConsultationMessageItem>> {
        let consultation = self.find_scoped(scope, id).await?;
        self.read_messages(consultation.id, SenderType::Admin).await
    }

    pub async fn close(&self, user_id: &str, id: i64) -> AppResult<ConsultationResponse> {
        let consultation = self.find_own(user_id, id).await?;
        if consultation.status == ConsultationStatus::Closed {
            return Ok(consultation.into());
        }
        let now = Utc::now();
        let mut active: consultations::ActiveModel = consultation.into();
        active.status = Set(ConsultationStatus::Closed);
        active.updated_at = Set(now);
        let closed = active.update(self.pool.as_ref()).await?;
        log::info!("Consultation {} closed by {user_id}", closed.id);
        Ok(closed.into())
    }

    pub async fn admin_list(&self, scope: &AdminScope) -> AppResult<Vec<ConsultationResponse>> {
        let rows = consultations::Entity::find()
            .filter(scope.user_condition(consultations::Column::UserId))
            .order_by_desc(consultations::Column::LastMessageAt)
            .order_by_desc(consultations::Column::Id)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// 管理员通知，未读在前
    pub async fn notifications(
        &self,
        scope: &AdminScope,
    ) -> AppResult<Vec<ConsultationNotificationItem>> {
        let mut select = notifications::Entity::find();
        if let AdminScope::Referrals(_) = scope {
            select = select.filter(
                notifications::Column::ConsultationId.in_subquery(
                    Query::select()
                        .column(consultations::Column::Id)
                        .from(consultations::Entity)
                        .cond_where(scope.user_condition(consultations::Column::UserId))
                        .to_owned(),
                ),
            );
        }
        let rows = select
            .order_by_asc(notifications::Column::IsRead)
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(NOTIFICATION_LIMIT)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::IntoPool;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use tokio::sync::watch;

    fn service(db: DbPool) -> ConsultationService {
        let (_tx, rx) = watch::channel(false);
        let (sse, _handle) = SseBroadcaster::spawn(4, rx);
        ConsultationService::new(db, sse)
    }

    fn consultation(status: ConsultationStatus) -> consultations::Model {
        let now = Utc::now();
        consultations::Model {
            id: 3,
            user_id: "u1".into(),
            user_name: "张三".into(),
            user_phone: None,
            status,
            last_message_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validate_content() {
        assert!(validate_content("  ").is_err());
        assert_eq!(validate_content(" 你好 ").unwrap(), "你好");
        assert!(validate_content(&"长".repeat(MAX_MESSAGE_CHARS + 1)).is_err());
    }

    #[tokio::test]
    async fn test_create_returns_active_consultation() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![consultation(ConsultationStatus::Chatting)]])
            .into_pool();
        let resp = service(db).create("u1").await.unwrap();
        assert_eq!(resp.id, 3);
        assert_eq!(resp.status, "chatting");
    }

    #[tokio::test]
    async fn test_message_to_closed_consultation_rejected() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![consultation(ConsultationStatus::Closed)]])
            .into_pool();
        let err = service(db)
            .send_user_message("u1", 3, "还在吗")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));
    }
}
