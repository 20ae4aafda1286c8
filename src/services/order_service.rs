use crate::config::OrderConfig;
use crate::database::DbPool;
use crate::entities::{
    OrderStatus, PayStatus, RefundStatus, user_address_entity as addresses,
    order_entity as orders, patient_entity as patients, referral_entity as referrals,
    service_item_entity as service_items, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CancelOrderRequest, OrderListQuery, OrderResponse, PaginatedResponse, Pagination,
    PayConfirmRequest, PayOrderRequest, PayParams, RefundOrderRequest, SubmitOrderRequest,
    SubmitOrderResponse, TimeSlotsResponse,
};
use crate::services::{AdminScope, CommissionService, SseBroadcaster, calculate_commission};
use crate::utils::appointment::{time_slots_for, validate_appointment};
use crate::utils::code_generator::{generate_nonce_str, generate_order_no, generate_transaction_id};
use crate::utils::money::round2;
use chrono::{Duration, Local, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 启用状态（服务上架、地址/就诊人有效）
const STATUS_ACTIVE: i32 = 1;

/// 模拟微信支付签名：按参数名排序拼接后追加 key，MD5 大写
pub fn sign_pay_params(
    app_id: &str,
    time_stamp: &str,
    nonce_str: &str,
    package: &str,
    key: &str,
) -> String {
    let raw = format!(
        "appId={app_id}&nonceStr={nonce_str}&package={package}&signType=MD5&timeStamp={time_stamp}&key={key}"
    );
    format!("{:x}", md5::compute(raw.as_bytes())).to_uppercase()
}

#[derive(Clone)]
pub struct OrderService {
    pool: DbPool,
    sse: SseBroadcaster,
    app_id: String,
    pay_sign_key: String,
    pay_timeout_minutes: i64,
}

impl OrderService {
    pub fn new(
        pool: DbPool,
        sse: SseBroadcaster,
        order_cfg: &OrderConfig,
        app_id: &str,
    ) -> Self {
        Self {
            pool,
            sse,
            app_id: app_id.to_string(),
            pay_sign_key: order_cfg.pay_sign_key.clone(),
            pay_timeout_minutes: order_cfg.pay_timeout_minutes,
        }
    }

    async fn find_user_order(&self, user_id: &str, order_id: i64) -> AppResult<orders::Model> {
        orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("订单不存在".into()))
    }

    /// 推荐人：显式指定且为他人的有效用户优先，否则取买家的推荐关系
    async fn resolve_referrer(
        &self,
        buyer_id: &str,
        explicit: Option<&str>,
    ) -> AppResult<Option<String>> {
        if let Some(candidate) = explicit.map(str::trim).filter(|s| !s.is_empty() && *s != buyer_id)
        {
            let exists = users::Entity::find()
                .filter(users::Column::UserId.eq(candidate))
                .count(self.pool.as_ref())
                .await?
                > 0;
            if exists {
                return Ok(Some(candidate.to_string()));
            }
            log::warn!("Ignoring unknown referrer {candidate} for buyer {buyer_id}");
        }

        let referral = referrals::Entity::find()
            .filter(referrals::Column::UserId.eq(buyer_id))
            .one(self.pool.as_ref())
            .await?;
        Ok(referral
            .and_then(|r| r.referrer_id)
            .filter(|r| !r.is_empty() && r != buyer_id))
    }

    /// 提交订单
    ///
    /// 1. 校验必填 ID、预约时间窗与时段、数量
    /// 2. 服务须存在且已上架，就诊人/地址须属于当前用户
    /// 3. 计算总额与佣金，解析推荐人
    /// 4. 以 待支付/未支付 状态落库并推送 orderUpdate
    pub async fn submit(
        &self,
        user_id: &str,
        req: SubmitOrderRequest,
    ) -> AppResult<SubmitOrderResponse> {
        if req.service_id == 0 || req.patient_id == 0 || req.address_id == 0 {
            return Err(AppError::ValidationError("缺少必要参数".into()));
        }

        let now_local = Local::now();
        validate_appointment(
            &req.appointment_date,
            &req.appointment_time,
            now_local.naive_local(),
        )?;

        let quantity = req.quantity.unwrap_or(1);
        if quantity <= 0 {
            return Err(AppError::ValidationError("数量必须大于0".into()));
        }

        let service = service_items::Entity::find_by_id(req.service_id)
            .one(self.pool.as_ref())
            .await?
            .filter(|s| s.status == STATUS_ACTIVE)
            .ok_or_else(|| AppError::BusinessError("服务不存在或已下架".into()))?;

        patients::Entity::find_by_id(req.patient_id)
            .filter(patients::Column::UserId.eq(user_id))
            .filter(patients::Column::Status.eq(STATUS_ACTIVE))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::BusinessError("就诊人不存在".into()))?;

        addresses::Entity::find_by_id(req.address_id)
            .filter(addresses::Column::UserId.eq(user_id))
            .filter(addresses::Column::Status.eq(STATUS_ACTIVE))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::BusinessError("服务地址不存在".into()))?;

        let total_amount = round2(service.price * quantity as f64);
        let commission = calculate_commission(total_amount);
        let referrer_id = self
            .resolve_referrer(user_id, req.referrer_id.as_deref())
            .await?;

        let now = Utc::now();
        let pay_deadline = now + Duration::minutes(self.pay_timeout_minutes);
        let form_data = req
            .form_data
            .as_ref()
            .filter(|v| !v.is_null())
            .map(serde_json::to_string)
            .transpose()?;

        let order = orders::ActiveModel {
            order_no: Set(generate_order_no(now_local)),
            user_id: Set(user_id.to_string()),
            service_id: Set(service.id),
            patient_id: Set(req.patient_id),
            address_id: Set(req.address_id),
            appointment_date: Set(req.appointment_date.clone()),
            appointment_time: Set(req.appointment_time.clone()),
            disease_info: Set(req.disease_info.clone()),
            need_toilet_assist: Set(i32::from(req.need_toilet_assist.as_deref() == Some("1"))),
            service_name: Set(service.name.clone()),
            price: Set(service.price),
            quantity: Set(quantity),
            total_amount: Set(total_amount),
            form_data: Set(form_data),
            status: Set(OrderStatus::Pending),
            pay_status: Set(PayStatus::Unpaid),
            pay_deadline: Set(Some(pay_deadline)),
            refund_status: Set(RefundStatus::None),
            refund_amount: Set(0.0),
            remark: Set(req.remark.clone()),
            referrer_id: Set(referrer_id),
            commission: Set(commission),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!(
            "Order {} submitted by {user_id}, total {total_amount}, referrer {:?}",
            order.order_no,
            order.referrer_id
        );
        self.sse.order_updated(&order);

        Ok(SubmitOrderResponse {
            order_id: order.id,
            order_no: order.order_no,
            total_amount: order.total_amount,
            pay_deadline: order.pay_deadline,
        })
    }

    /// 发起支付，返回小程序支付参数（模拟）
    pub async fn pay(
        &self,
        user_id: &str,
        order_id: i64,
        req: PayOrderRequest,
    ) -> AppResult<PayParams> {
        let order = self.find_user_order(user_id, order_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::BusinessError("订单状态不允许支付".into()));
        }
        if order.pay_deadline.is_some_and(|d| d < Utc::now()) {
            return Err(AppError::BusinessError("订单已超时，请重新下单".into()));
        }

        let pay_method = req.pay_method.unwrap_or_else(|| "wechat".to_string());
        let now_local = Local::now();
        let time_stamp = now_local.timestamp().to_string();
        let nonce_str = generate_nonce_str();
        let package = format!("prepay_id=wx{}", generate_transaction_id(now_local));
        let pay_sign = sign_pay_params(
            &self.app_id,
            &time_stamp,
            &nonce_str,
            &package,
            &self.pay_sign_key,
        );

        log::info!("Prepay issued for order {} via {pay_method}", order.order_no);
        Ok(PayParams {
            time_stamp,
            nonce_str,
            package,
            sign_type: "MD5".to_string(),
            pay_sign,
        })
    }

    /// 支付确认：订单状态更新与佣金写入在同一事务中
    pub async fn pay_confirm(
        &self,
        user_id: &str,
        order_id: i64,
        req: PayConfirmRequest,
    ) -> AppResult<OrderResponse> {
        let txn = self.pool.begin().await?;

        let order = orders::Entity::find_by_id(order_id)
            .filter(orders::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("订单不存在".into()))?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::BusinessError("订单状态不允许支付".into()));
        }

        let now = Utc::now();
        let transaction_id = req
            .transaction_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| generate_transaction_id(Local::now()));
        let pay_method = req.pay_method.unwrap_or_else(|| "wechat".to_string());

        let result = orders::Entity::update_many()
            .col_expr(orders::Column::PayStatus, Expr::value(PayStatus::Paid))
            .col_expr(orders::Column::Status, Expr::value(OrderStatus::Paid))
            .col_expr(orders::Column::PayTime, Expr::value(now))
            .col_expr(orders::Column::PayMethod, Expr::value(pay_method.clone()))
            .col_expr(
                orders::Column::TransactionId,
                Expr::value(transaction_id.clone()),
            )
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Pending))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::BusinessError("订单状态已变更，请刷新".into()));
        }

        let paid = orders::Model {
            status: OrderStatus::Paid,
            pay_status: PayStatus::Paid,
            pay_time: Some(now),
            pay_method: Some(pay_method),
            transaction_id: Some(transaction_id),
            updated_at: now,
            ..order
        };

        CommissionService::create_for_paid_order(&txn, &paid).await?;

        txn.commit().await?;

        log::info!("Order {} paid, transaction {:?}", paid.order_no, paid.transaction_id);
        self.sse.order_updated(&paid);
        Ok(paid.into())
    }

    /// 取消订单，仅待支付可取消
    pub async fn cancel(
        &self,
        user_id: &str,
        order_id: i64,
        req: CancelOrderRequest,
    ) -> AppResult<OrderResponse> {
        let order = self.find_user_order(user_id, order_id).await?;
        if order.status != OrderStatus::Pending {
            return Err(AppError::BusinessError("只有待支付订单可以取消".into()));
        }

        let now = Utc::now();
        let reason = req.reason.filter(|r| !r.trim().is_empty());
        let mut update = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(OrderStatus::Cancelled))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now));
        if let Some(reason) = &reason {
            update = update.col_expr(orders::Column::Remark, Expr::value(reason.clone()));
        }
        let result = update
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Pending))
            .exec(self.pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::BusinessError("订单状态已变更，请刷新".into()));
        }

        let cancelled = orders::Model {
            status: OrderStatus::Cancelled,
            remark: reason.or(order.remark.clone()),
            updated_at: now,
            ..order
        };
        log::info!("Order {} cancelled by user", cancelled.order_no);
        self.sse.order_updated(&cancelled);
        Ok(cancelled.into())
    }

    /// 申请退款，仅已支付订单
    pub async fn refund(
        &self,
        user_id: &str,
        order_id: i64,
        req: RefundOrderRequest,
    ) -> AppResult<OrderResponse> {
        let order = self.find_user_order(user_id, order_id).await?;
        if order.status != OrderStatus::Paid {
            return Err(AppError::BusinessError("只有已支付订单可以申请退款".into()));
        }
        if order.refund_status != RefundStatus::None {
            return Err(AppError::BusinessError("退款申请已提交".into()));
        }
        let amount = round2(req.refund_amount);
        if amount <= 0.0 || amount > order.total_amount {
            return Err(AppError::ValidationError("退款金额不正确".into()));
        }
        if req.reason.trim().is_empty() {
            return Err(AppError::ValidationError("请填写退款原因".into()));
        }

        let now = Utc::now();
        let result = orders::Entity::update_many()
            .col_expr(
                orders::Column::RefundStatus,
                Expr::value(RefundStatus::Processing),
            )
            .col_expr(orders::Column::RefundAmount, Expr::value(amount))
            .col_expr(orders::Column::RefundReason, Expr::value(req.reason.clone()))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Paid))
            .filter(orders::Column::RefundStatus.eq(RefundStatus::None))
            .exec(self.pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::BusinessError("订单状态已变更，请刷新".into()));
        }

        let refunding = orders::Model {
            refund_status: RefundStatus::Processing,
            refund_amount: amount,
            refund_reason: Some(req.reason),
            updated_at: now,
            ..order
        };
        log::info!("Refund requested for order {}: {amount}", refunding.order_no);
        self.sse.order_updated(&refunding);
        Ok(refunding.into())
    }

    /// 我的订单，按创建时间倒序
    pub async fn list(
        &self,
        user_id: &str,
        query: &OrderListQuery,
    ) -> AppResult<PaginatedResponse<OrderResponse>> {
        let pagination = Pagination::new(query.page, query.page_size, 10, 50);
        let mut select = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
        if let Some(code) = query.status {
            let status = OrderStatus::from_code(code)
                .ok_or_else(|| AppError::ValidationError("无效的订单状态".into()))?;
            select = select.filter(orders::Column::Status.eq(status));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_desc(orders::Column::CreatedAt)
            .order_by_desc(orders::Column::Id)
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

    /// 订单详情：本人或管理员可见
    pub async fn detail(&self, user_id: &str, order_id: i64) -> AppResult<OrderResponse> {
        let order = orders::Entity::find_by_id(order_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("订单不存在".into()))?;

        if order.user_id != user_id {
            let is_admin = users::Entity::find()
                .filter(users::Column::UserId.eq(user_id))
                .filter(users::Column::IsAdmin.eq(true))
                .count(self.pool.as_ref())
                .await?
                > 0;
            if !is_admin {
                return Err(AppError::PermissionDenied);
            }
        }

        Ok(order.into())
    }

    pub fn time_slots(&self, date: &str) -> AppResult<TimeSlotsResponse> {
        let time_slots = time_slots_for(date, Local::now().naive_local())?;
        Ok(TimeSlotsResponse {
            date: date.to_string(),
            time_slots,
        })
    }

    async fn admin_transition(
        &self,
        scope: &AdminScope,
        order_id: i64,
        expected: RefundStatus,
        apply: impl FnOnce(&mut orders::Model, chrono::DateTime<Utc>),
    ) -> AppResult<orders::Model> {
        let order = orders::Entity::find_by_id(order_id)
            .filter(scope.user_condition(orders::Column::UserId))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("订单不存在".into()))?;

        if order.status != OrderStatus::Paid || order.refund_status != expected {
            return Err(AppError::BusinessError(format!(
                "订单当前状态为{}，无法操作",
                order.status.text()
            )));
        }

        let now = Utc::now();
        let mut next = order.clone();
        apply(&mut next, now);
        next.updated_at = now;

        let result = orders::Entity::update_many()
            .col_expr(orders::Column::Status, Expr::value(next.status))
            .col_expr(orders::Column::RefundStatus, Expr::value(next.refund_status))
            .col_expr(orders::Column::RefundTime, Expr::value(next.refund_time))
            .col_expr(orders::Column::UpdatedAt, Expr::value(now))
            .filter(orders::Column::Id.eq(order.id))
            .filter(orders::Column::Status.eq(OrderStatus::Paid))
            .filter(orders::Column::RefundStatus.eq(expected))
            .exec(self.pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::BusinessError("订单状态已变更，请刷新".into()));
        }

        self.sse.order_updated(&next);
        Ok(next)
    }

    /// 服务完成：已支付 -> 已完成（有退款申请时不可完成）
    pub async fn admin_complete(&self, scope: &AdminScope, order_id: i64) -> AppResult<OrderResponse> {
        let order = self
            .admin_transition(scope, order_id, RefundStatus::None, |o, _| {
                o.status = OrderStatus::Completed;
            })
            .await?;
        log::info!("Order {} completed", order.order_no);
        Ok(order.into())
    }

    /// 确认退款：退款中 -> 已退款，订单状态同步为已退款
    pub async fn admin_confirm_refund(
        &self,
        scope: &AdminScope,
        order_id: i64,
    ) -> AppResult<OrderResponse> {
        let order = self
            .admin_transition(scope, order_id, RefundStatus::Processing, |o, now| {
                o.status = OrderStatus::Refunded;
                o.refund_status = RefundStatus::Refunded;
                o.refund_time = Some(now);
            })
            .await?;
        log::info!("Order {} refunded: {}", order.order_no, order.refund_amount);
        Ok(order.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use crate::entities::{CommissionStatus, commission_entity as commissions};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use tokio::sync::watch;

    fn pending_order(referrer: Option<&str>) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 1,
            order_no: "ORDER20256101234567".into(),
            user_id: "buyer0000000000000000001".into(),
            service_id: 1,
            patient_id: 2,
            address_id: 3,
            appointment_date: "2025-06-11".into(),
            appointment_time: "08:00".into(),
            disease_info: None,
            need_toilet_assist: 1,
            service_name: "陪诊".into(),
            price: 100.0,
            quantity: 2,
            total_amount: 200.0,
            form_data: Some(r#"{"note":"x"}"#.into()),
            status: OrderStatus::Pending,
            pay_status: PayStatus::Unpaid,
            pay_deadline: Some(now + Duration::minutes(30)),
            pay_time: None,
            pay_method: None,
            transaction_id: None,
            refund_status: RefundStatus::None,
            refund_time: None,
            refund_amount: 0.0,
            refund_reason: None,
            remark: None,
            referrer_id: referrer.map(String::from),
            commission: calculate_commission(200.0),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DbPool) -> OrderService {
        let (_tx, rx) = watch::channel(false);
        let (sse, _handle) = SseBroadcaster::spawn(4, rx);
        OrderService::new(db, sse, &OrderConfig::default(), "wx_test_app")
    }

    fn exec(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[test]
    fn test_commission_is_five_percent_of_total() {
        let total = round2(100.0 * 2_f64);
        assert_eq!(total, 200.0);
        assert_eq!(calculate_commission(total), 10.0);
    }

    #[test]
    fn test_pay_sign_is_stable_uppercase_md5() {
        let a = sign_pay_params("wx1", "1700000000", "abc", "prepay_id=wx1", "key");
        let b = sign_pay_params("wx1", "1700000000", "abc", "prepay_id=wx1", "key");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert_eq!(a, a.to_uppercase());
        assert_ne!(a, sign_pay_params("wx1", "1700000000", "abc", "prepay_id=wx1", "k2"));
    }

    #[tokio::test]
    async fn test_pay_confirm_with_referrer_creates_one_commission() {
        let order = pending_order(Some("referrer0000000000000001"));
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()]])
            .append_exec_results([
                exec(1),
                MockExecResult {
                    last_insert_id: 9,
                    rows_affected: 1,
                },
            ])
            .append_query_results([vec![commissions::Model {
                id: 9,
                user_id: "referrer0000000000000001".into(),
                order_id: order.id,
                order_no: order.order_no.clone(),
                amount: 10.0,
                rate: 0.05,
                status: CommissionStatus::Pending,
                cashout_time: None,
                created_at: now,
                updated_at: now,
            }]])
            .into_pool();

        let svc = service(db.clone());
        let resp = svc
            .pay_confirm(&order.user_id, order.id, PayConfirmRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.status, 1);
        assert_eq!(resp.pay_status, 1);
        assert!(resp.transaction_id.unwrap().starts_with("TXN"));

        drop(svc);
        let log = transaction_log(db);
        assert_eq!(log.matches("INSERT INTO `commissions`").count(), 1);
    }

    #[tokio::test]
    async fn test_pay_confirm_without_referrer_creates_no_commission() {
        let order = pending_order(None);
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()]])
            .append_exec_results([exec(1)])
            .into_pool();

        let svc = service(db.clone());
        svc.pay_confirm(&order.user_id, order.id, PayConfirmRequest::default())
            .await
            .unwrap();

        drop(svc);
        let log = transaction_log(db);
        assert!(!log.contains("INSERT INTO `commissions`"));
    }

    #[tokio::test]
    async fn test_second_pay_is_rejected() {
        let mut order = pending_order(None);
        order.status = OrderStatus::Paid;
        order.pay_status = PayStatus::Paid;
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()], vec![order.clone()]])
            .into_pool();

        let svc = service(db);
        let err = svc
            .pay_confirm(&order.user_id, order.id, PayConfirmRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));

        let err = svc
            .pay(&order.user_id, order.id, PayOrderRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));
    }

    #[tokio::test]
    async fn test_concurrent_transition_detected() {
        let order = pending_order(None);
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()]])
            .append_exec_results([exec(0)])
            .into_pool();

        let svc = service(db);
        let err = svc
            .pay_confirm(&order.user_id, order.id, PayConfirmRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(msg) if msg.contains("已变更")));
    }

    #[tokio::test]
    async fn test_cancel_after_pay_is_rejected() {
        let mut order = pending_order(Some("referrer0000000000000001"));
        order.status = OrderStatus::Paid;
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()]])
            .into_pool();

        let err = service(db)
            .cancel(&order.user_id, order.id, CancelOrderRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));
    }

    #[tokio::test]
    async fn test_cancel_pending_order() {
        let order = pending_order(None);
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()]])
            .append_exec_results([exec(1)])
            .into_pool();

        let resp = service(db)
            .cancel(
                &order.user_id,
                order.id,
                CancelOrderRequest {
                    reason: Some("时间冲突".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status, 3);
        assert_eq!(resp.status_text, "已取消");
        assert_eq!(resp.remark.as_deref(), Some("时间冲突"));
    }

    #[tokio::test]
    async fn test_refund_amount_bounds() {
        let mut order = pending_order(None);
        order.status = OrderStatus::Paid;
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()], vec![order.clone()]])
            .append_exec_results([exec(1)])
            .into_pool();
        let svc = service(db);

        let err = svc
            .refund(
                &order.user_id,
                order.id,
                RefundOrderRequest {
                    refund_amount: 250.0,
                    reason: "不需要了".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let resp = svc
            .refund(
                &order.user_id,
                order.id,
                RefundOrderRequest {
                    refund_amount: 200.0,
                    reason: "不需要了".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.refund_status, 1);
        assert_eq!(resp.refund_amount, 200.0);
    }

    #[tokio::test]
    async fn test_submit_validates_before_touching_db() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let svc = service(db);
        let req = SubmitOrderRequest {
            service_id: 1,
            patient_id: 0,
            address_id: 3,
            appointment_date: "2025-06-11".into(),
            appointment_time: "08:00".into(),
            disease_info: None,
            need_toilet_assist: None,
            quantity: None,
            form_data: None,
            remark: None,
            referrer_id: None,
        };
        assert!(matches!(
            svc.submit("buyer0000000000000000001", req).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_prices_order_and_records_commission() {
        let now = Utc::now();
        let tomorrow = (Local::now().date_naive() + Duration::days(1))
            .format("%Y-%m-%d")
            .to_string();
        let buyer = "buyer0000000000000000001";
        let listed = service_items::Model {
            id: 1,
            name: "陪诊".into(),
            description: None,
            category: "escort".into(),
            price: 100.0,
            original_price: 120.0,
            image_url: None,
            detail_images: None,
            form_config: None,
            status: STATUS_ACTIVE,
            sort: 1,
            created_at: now,
            updated_at: now,
        };
        let patient = patients::Model {
            id: 2,
            user_id: buyer.into(),
            name: "张三".into(),
            id_card: None,
            phone: None,
            gender: 1,
            birthday: None,
            relation: Some("本人".into()),
            is_default: true,
            status: STATUS_ACTIVE,
            created_at: now,
            updated_at: now,
        };
        let address = addresses::Model {
            id: 3,
            user_id: buyer.into(),
            name: "张三".into(),
            phone: "13800000000".into(),
            province: "广东省".into(),
            city: "深圳市".into(),
            district: "南山区".into(),
            address: "科技园".into(),
            is_default: true,
            status: STATUS_ACTIVE,
            created_at: now,
            updated_at: now,
        };
        let referral = referrals::Model {
            id: 9,
            user_id: buyer.into(),
            referrer_id: Some("referrer0000000000000001".into()),
            promoter_code: Some("ABC123".into()),
            qr_code_url: None,
            status: 1,
            created_at: now,
            updated_at: now,
        };
        let mut stored = pending_order(Some("referrer0000000000000001"));
        stored.appointment_date = tomorrow.clone();

        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![listed]])
            .append_query_results([vec![patient]])
            .append_query_results([vec![address]])
            .append_query_results([vec![referral]])
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .append_query_results([vec![stored]])
            .into_pool();
        let svc = service(db.clone());
        let req = SubmitOrderRequest {
            service_id: 1,
            patient_id: 2,
            address_id: 3,
            appointment_date: tomorrow,
            appointment_time: "08:00".into(),
            disease_info: None,
            need_toilet_assist: Some("1".into()),
            quantity: Some(2),
            form_data: None,
            remark: None,
            referrer_id: None,
        };

        let resp = svc.submit(buyer, req).await.unwrap();
        assert_eq!(resp.order_id, 1);
        assert_eq!(resp.total_amount, 200.0);
        assert!(resp.pay_deadline.is_some_and(|d| d > now));

        drop(svc);
        let log = transaction_log(db);
        let insert = log
            .split("Statement")
            .find(|stmt| stmt.contains("INSERT INTO `orders`"))
            .expect("order insert");
        assert!(insert.contains("`commission`"));
        assert!(insert.contains("`pay_deadline`"));
        assert!(insert.contains("Double(Some(200.0))"));
        assert!(insert.contains("Double(Some(10.0))"));
        assert!(insert.contains("referrer0000000000000001"));
    }

    #[tokio::test]
    async fn test_admin_confirm_refund() {
        let mut order = pending_order(None);
        order.status = OrderStatus::Paid;
        order.refund_status = RefundStatus::Processing;
        order.refund_amount = 50.0;
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![order.clone()]])
            .append_exec_results([exec(1)])
            .into_pool();

        let resp = service(db)
            .admin_confirm_refund(&AdminScope::All, order.id)
            .await
            .unwrap();
        assert_eq!(resp.status, 4);
        assert_eq!(resp.refund_status, 2);
        assert!(resp.refund_time.is_some());
    }
}
