use crate::database::DbPool;
use crate::entities::{OrderStatus, PayStatus, order_entity as orders};
use crate::error::AppResult;
use crate::services::SseBroadcaster;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

/// 待支付且已过支付截止时间
fn expired_condition(now: DateTime<Utc>) -> sea_orm::Condition {
    sea_orm::Condition::all()
        .add(orders::Column::Status.eq(OrderStatus::Pending))
        .add(orders::Column::PayStatus.eq(PayStatus::Unpaid))
        .add(orders::Column::PayDeadline.lt(now))
}

#[derive(Clone)]
pub struct OrderTimeoutService {
    pool: DbPool,
    sse: SseBroadcaster,
}

impl OrderTimeoutService {
    pub fn new(pool: DbPool, sse: SseBroadcaster) -> Self {
        Self { pool, sse }
    }

    pub async fn get_expired_orders(&self, now: DateTime<Utc>) -> AppResult<Vec<orders::Model>> {
        Ok(orders::Entity::find()
            .filter(expired_condition(now))
            .all(self.pool.as_ref())
            .await?)
    }

    /// 单条 UPDATE 批量取消，返回影响行数
    pub async fn batch_cancel_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let res = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(expired_condition(now))
            .exec(self.pool.as_ref())
            .await?;
        Ok(res.rows_affected)
    }

    pub async fn count_expired(&self) -> AppResult<u64> {
        Ok(orders::Entity::find()
            .filter(expired_condition(Utc::now()))
            .count(self.pool.as_ref())
            .await?)
    }

    /// 执行一次超时检查：取消过期订单并逐单推送
    pub async fn run_once(&self) -> AppResult<u64> {
        let now = Utc::now();
        let expired = self.get_expired_orders(now).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let cancelled = self.batch_cancel_expired(now).await?;
        for order in expired {
            log::info!("Order {} cancelled: payment timeout", order.order_no);
            let order = orders::Model {
                status: OrderStatus::Cancelled,
                updated_at: now,
                ..order
            };
            self.sse.order_updated(&order);
        }
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use crate::entities::RefundStatus;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;
    use tokio::sync::watch;

    fn overdue_order() -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 7,
            order_no: "ORDER20250611000007".into(),
            user_id: "buyer0000000000000000001".into(),
            service_id: 1,
            patient_id: 2,
            address_id: 3,
            appointment_date: "2025-06-12".into(),
            appointment_time: "09:00".into(),
            disease_info: None,
            need_toilet_assist: 0,
            service_name: "陪诊".into(),
            price: 100.0,
            quantity: 1,
            total_amount: 100.0,
            form_data: None,
            status: OrderStatus::Pending,
            pay_status: PayStatus::Unpaid,
            pay_deadline: Some(now - Duration::minutes(1)),
            pay_time: None,
            pay_method: None,
            transaction_id: None,
            refund_status: RefundStatus::None,
            refund_time: None,
            refund_amount: 0.0,
            refund_reason: None,
            remark: None,
            referrer_id: None,
            commission: 0.0,
            created_at: now - Duration::minutes(31),
            updated_at: now - Duration::minutes(31),
        }
    }

    fn count(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::Int(Some(n as i32)))])
    }

    fn service(db: DbPool) -> OrderTimeoutService {
        let (_tx, rx) = watch::channel(false);
        let (sse, _handle) = SseBroadcaster::spawn(4, rx);
        OrderTimeoutService::new(db, sse)
    }

    #[tokio::test]
    async fn test_overdue_order_cancelled_by_one_tick() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![count(1)]])
            .append_query_results([vec![overdue_order()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![count(0)]])
            .into_pool();
        let svc = service(db.clone());

        assert_eq!(svc.count_expired().await.unwrap(), 1);
        assert_eq!(svc.run_once().await.unwrap(), 1);
        assert_eq!(svc.count_expired().await.unwrap(), 0);

        drop(svc);
        let log = transaction_log(db);
        assert!(log.contains("UPDATE `orders` SET `status`"));
        assert!(log.contains("`pay_deadline` <"));
    }

    #[tokio::test]
    async fn test_tick_without_expired_orders_skips_update() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([Vec::<orders::Model>::new()])
            .into_pool();
        assert_eq!(service(db.clone()).run_once().await.unwrap(), 0);
        let log = transaction_log(db);
        assert!(!log.contains("UPDATE"));
    }
}
