use crate::database::DbPool;
use crate::entities::{
    CashoutMethod, CashoutStatus, CommissionStatus, OrderStatus, cashout_entity as cashouts,
    commission_entity as commissions, order_entity as orders,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    ApplyCashoutRequest, ApplyCashoutResponse, CashoutItem, CommissionItem, LedgerListQuery,
    PaginatedResponse, Pagination, PromoterStats, SettleCommissionRequest,
};
use crate::services::AdminScope;
use crate::utils::money::{round2, sum2};
use chrono::{DateTime, Datelike, Local, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 佣金比例，全局唯一来源
pub const COMMISSION_RATE: f64 = 0.05;
/// 最低提现金额
pub const MIN_CASHOUT: f64 = 10.0;

/// 订单佣金 = 订单总额 * 佣金比例
pub fn calculate_commission(total_amount: f64) -> f64 {
    round2(total_amount * COMMISSION_RATE)
}

/// 可提现余额：已结算佣金 - 审核中/已通过的提现申请
///
/// 已到账的提现对应佣金已转为已提现，不再计入任何一侧。
pub fn available_balance(
    commission_rows: &[commissions::Model],
    cashout_rows: &[cashouts::Model],
) -> f64 {
    let settled = sum2(
        commission_rows
            .iter()
            .filter(|c| c.status == CommissionStatus::Settled)
            .map(|c| c.amount),
    );
    let reserved = sum2(
        cashout_rows
            .iter()
            .filter(|c| matches!(c.status, CashoutStatus::Pending | CashoutStatus::Approved))
            .map(|c| c.amount),
    );
    round2(settled - reserved)
}

/// 在内存中汇总推广收益，今日/本月按本地时间计算
pub fn compute_stats(rows: &[commissions::Model], now: DateTime<Local>) -> PromoterStats {
    let today = now.date_naive();
    let mut stats = PromoterStats::default();

    for c in rows {
        let created = c.created_at.with_timezone(&Local).date_naive();
        let is_today = created == today;
        let is_month = created.year() == today.year() && created.month() == today.month();

        stats.total_income += c.amount;
        stats.total_orders += 1;
        if is_today {
            stats.today_income += c.amount;
            stats.today_orders += 1;
        }
        if is_month {
            stats.month_income += c.amount;
            stats.month_orders += 1;
        }
        match c.status {
            CommissionStatus::Pending => stats.pending_amount += c.amount,
            CommissionStatus::Settled => stats.settled_amount += c.amount,
            CommissionStatus::Withdrawn => stats.withdrawn_amount += c.amount,
        }
    }

    stats.total_income = round2(stats.total_income);
    stats.today_income = round2(stats.today_income);
    stats.month_income = round2(stats.month_income);
    stats.pending_amount = round2(stats.pending_amount);
    stats.settled_amount = round2(stats.settled_amount);
    stats.withdrawn_amount = round2(stats.withdrawn_amount);
    stats
}

/// 从最早的已结算佣金开始累加，直到覆盖提现金额
fn pick_commissions_to_withdraw(settled: &[commissions::Model], amount: f64) -> Vec<i64> {
    let mut covered = 0.0;
    let mut ids = Vec::new();
    for c in settled {
        if round2(covered) >= amount {
            break;
        }
        covered += c.amount;
        ids.push(c.id);
    }
    ids
}

#[derive(Clone)]
pub struct CommissionService {
    pool: DbPool,
}

impl CommissionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// 订单支付成功时写入佣金（须在支付事务内调用）
    /// 仅当存在推荐人且佣金大于 0 时创建，一单一条
    pub async fn create_for_paid_order<C: ConnectionTrait>(
        conn: &C,
        order: &orders::Model,
    ) -> AppResult<Option<commissions::Model>> {
        if !order.has_referrer() || order.commission <= 0.0 {
            return Ok(None);
        }
        let referrer_id = order.referrer_id.as_deref().unwrap_or_default();

        let now = Utc::now();
        let model = commissions::ActiveModel {
            user_id: Set(referrer_id.to_string()),
            order_id: Set(order.id),
            order_no: Set(order.order_no.clone()),
            amount: Set(order.commission),
            rate: Set(COMMISSION_RATE),
            status: Set(CommissionStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        log::info!(
            "Commission {} created for order {} referrer {} amount {}",
            model.id,
            order.order_no,
            referrer_id,
            model.amount
        );
        Ok(Some(model))
    }

    pub async fn user_commissions(&self, user_id: &str) -> AppResult<Vec<commissions::Model>> {
        Ok(commissions::Entity::find()
            .filter(commissions::Column::UserId.eq(user_id))
            .order_by_desc(commissions::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?)
    }

    pub async fn stats(&self, user_id: &str) -> AppResult<PromoterStats> {
        let rows = self.user_commissions(user_id).await?;
        Ok(compute_stats(&rows, Local::now()))
    }

    /// 已结算佣金合计（推荐报表用）
    pub async fn total_settled(&self, user_id: &str) -> AppResult<f64> {
        let rows = commissions::Entity::find()
            .filter(commissions::Column::UserId.eq(user_id))
            .filter(commissions::Column::Status.eq(CommissionStatus::Settled))
            .all(self.pool.as_ref())
            .await?;
        Ok(sum2(rows.iter().map(|c| c.amount)))
    }

    pub async fn list_commissions(
        &self,
        user_id: &str,
        query: &LedgerListQuery,
    ) -> AppResult<PaginatedResponse<CommissionItem>> {
        let pagination = Pagination::new(query.page, query.page_size, 20, 50);
        let mut select =
            commissions::Entity::find().filter(commissions::Column::UserId.eq(user_id));
        if let Some(code) = query.status {
            let status = CommissionStatus::from_code(code)
                .ok_or_else(|| AppError::ValidationError("无效的佣金状态".into()))?;
            select = select.filter(commissions::Column::Status.eq(status));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_desc(commissions::Column::CreatedAt)
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

    pub async fn list_cashouts(
        &self,
        user_id: &str,
        query: &LedgerListQuery,
    ) -> AppResult<PaginatedResponse<CashoutItem>> {
        self.query_cashouts(Some(user_id), &AdminScope::All, query)
            .await
    }

    /// 管理端提现列表，子管理员只能看到自己推荐的用户
    pub async fn admin_list_cashouts(
        &self,
        scope: &AdminScope,
        query: &LedgerListQuery,
    ) -> AppResult<PaginatedResponse<CashoutItem>> {
        self.query_cashouts(None, scope, query).await
    }

    async fn query_cashouts(
        &self,
        user_id: Option<&str>,
        scope: &AdminScope,
        query: &LedgerListQuery,
    ) -> AppResult<PaginatedResponse<CashoutItem>> {
        let pagination = Pagination::new(query.page, query.page_size, 20, 50);
        let mut select = cashouts::Entity::find()
            .filter(scope.user_condition(cashouts::Column::UserId));
        if let Some(user_id) = user_id {
            select = select.filter(cashouts::Column::UserId.eq(user_id));
        }
        if let Some(code) = query.status {
            let status = CashoutStatus::from_code(code)
                .ok_or_else(|| AppError::ValidationError("无效的提现状态".into()))?;
            select = select.filter(cashouts::Column::Status.eq(status));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_desc(cashouts::Column::CreatedAt)
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

    async fn balance_of<C: ConnectionTrait>(conn: &C, user_id: &str) -> AppResult<f64> {
        let commission_rows = commissions::Entity::find()
            .filter(commissions::Column::UserId.eq(user_id))
            .filter(commissions::Column::Status.eq(CommissionStatus::Settled))
            .all(conn)
            .await?;
        let cashout_rows = cashouts::Entity::find()
            .filter(cashouts::Column::UserId.eq(user_id))
            .filter(
                cashouts::Column::Status.is_in([CashoutStatus::Pending, CashoutStatus::Approved]),
            )
            .all(conn)
            .await?;
        Ok(available_balance(&commission_rows, &cashout_rows))
    }

    pub async fn available_balance(&self, user_id: &str) -> AppResult<f64> {
        Self::balance_of(self.pool.as_ref(), user_id).await
    }

    /// 申请提现：余额校验与写入在同一事务中
    pub async fn apply_cashout(
        &self,
        user_id: &str,
        req: &ApplyCashoutRequest,
    ) -> AppResult<ApplyCashoutResponse> {
        let (Some(amount), Some(method), Some(account)) = (
            req.amount,
            req.method.as_deref().filter(|s| !s.is_empty()),
            req.account.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            return Err(AppError::ValidationError("缺少必要参数".into()));
        };

        let method = CashoutMethod::parse(method)
            .ok_or_else(|| AppError::ValidationError("不支持的提现方式".into()))?;
        let amount = round2(amount);
        if amount < MIN_CASHOUT {
            return Err(AppError::BusinessError(format!(
                "提现金额不能少于{MIN_CASHOUT:.0}元"
            )));
        }

        let txn = self.pool.begin().await?;

        let balance = Self::balance_of(&txn, user_id).await?;
        if amount > balance {
            return Err(AppError::BusinessError(format!(
                "可提现余额不足，当前可提现{balance:.2}元"
            )));
        }

        let now = Utc::now();
        let cashout = cashouts::ActiveModel {
            user_id: Set(user_id.to_string()),
            amount: Set(amount),
            method: Set(method),
            account: Set(account.to_string()),
            status: Set(CashoutStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!("Cashout {} applied by {user_id}: {amount} via {method}", cashout.id);
        Ok(ApplyCashoutResponse {
            cashout_id: cashout.id,
            amount: cashout.amount,
            method: cashout.method.to_string(),
            status: cashout.status.to_value(),
            message: "提现申请已提交，请等待审核".to_string(),
        })
    }

    /// 结算佣金：待结算 -> 已结算，仅限订单已支付或已完成
    pub async fn settle(&self, req: &SettleCommissionRequest) -> AppResult<u64> {
        let mut select = commissions::Entity::find()
            .filter(commissions::Column::Status.eq(CommissionStatus::Pending));
        match (&req.commission_ids, req.order_id) {
            (Some(ids), _) if !ids.is_empty() => {
                select = select.filter(commissions::Column::Id.is_in(ids.clone()));
            }
            (_, Some(order_id)) => {
                select = select.filter(commissions::Column::OrderId.eq(order_id));
            }
            _ => {
                return Err(AppError::ValidationError(
                    "请指定佣金ID或订单ID".into(),
                ));
            }
        }

        let candidates = select.all(self.pool.as_ref()).await?;
        if candidates.is_empty() {
            return Ok(0);
        }

        let order_ids: Vec<i64> = candidates.iter().map(|c| c.order_id).collect();
        let settleable_orders: Vec<i64> = orders::Entity::find()
            .filter(orders::Column::Id.is_in(order_ids))
            .filter(orders::Column::Status.is_in([OrderStatus::Paid, OrderStatus::Completed]))
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|o| o.id)
            .collect();

        let ids: Vec<i64> = candidates
            .iter()
            .filter(|c| settleable_orders.contains(&c.order_id))
            .map(|c| c.id)
            .collect();
        if ids.is_empty() {
            return Ok(0);
        }

        let result = commissions::Entity::update_many()
            .col_expr(
                commissions::Column::Status,
                Expr::value(CommissionStatus::Settled),
            )
            .col_expr(commissions::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(commissions::Column::Id.is_in(ids))
            .filter(commissions::Column::Status.eq(CommissionStatus::Pending))
            .exec(self.pool.as_ref())
            .await?;

        log::info!("Settled {} commissions", result.rows_affected);
        Ok(result.rows_affected)
    }

    /// 状态条件更新，返回更新后的记录
    async fn transition_cashout<C: ConnectionTrait>(
        conn: &C,
        scope: &AdminScope,
        cashout_id: i64,
        from: CashoutStatus,
        to: CashoutStatus,
        remark: Option<String>,
    ) -> AppResult<cashouts::Model> {
        let cashout = cashouts::Entity::find_by_id(cashout_id)
            .filter(scope.user_condition(cashouts::Column::UserId))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound("提现记录不存在".into()))?;

        if cashout.status != from {
            return Err(AppError::BusinessError(format!(
                "提现状态为{}，无法操作",
                cashout.status.text()
            )));
        }

        let now = Utc::now();
        let mut update = cashouts::Entity::update_many()
            .col_expr(cashouts::Column::Status, Expr::value(to))
            .col_expr(cashouts::Column::ProcessTime, Expr::value(now))
            .col_expr(cashouts::Column::UpdatedAt, Expr::value(now));
        if let Some(remark) = &remark {
            update = update.col_expr(cashouts::Column::Remark, Expr::value(remark.clone()));
        }
        let result = update
            .filter(cashouts::Column::Id.eq(cashout_id))
            .filter(cashouts::Column::Status.eq(from))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::BusinessError("提现状态已变更，请刷新".into()));
        }

        Ok(cashouts::Model {
            status: to,
            process_time: Some(now),
            updated_at: now,
            remark: remark.or(cashout.remark.clone()),
            ..cashout
        })
    }

    pub async fn approve_cashout(
        &self,
        scope: &AdminScope,
        cashout_id: i64,
    ) -> AppResult<CashoutItem> {
        let txn = self.pool.begin().await?;
        let cashout = Self::transition_cashout(
            &txn,
            scope,
            cashout_id,
            CashoutStatus::Pending,
            CashoutStatus::Approved,
            None,
        )
        .await?;
        txn.commit().await?;
        log::info!("Cashout {cashout_id} approved");
        Ok(cashout.into())
    }

    /// 拒绝后该笔金额不再占用余额
    pub async fn reject_cashout(
        &self,
        scope: &AdminScope,
        cashout_id: i64,
        remark: Option<String>,
    ) -> AppResult<CashoutItem> {
        let txn = self.pool.begin().await?;
        let cashout = Self::transition_cashout(
            &txn,
            scope,
            cashout_id,
            CashoutStatus::Pending,
            CashoutStatus::Rejected,
            remark,
        )
        .await?;
        txn.commit().await?;
        log::info!("Cashout {cashout_id} rejected, {} released", cashout.amount);
        Ok(cashout.into())
    }

    /// 打款：已通过 -> 已到账，同一事务内把最早的已结算佣金标记为已提现
    pub async fn pay_cashout(&self, scope: &AdminScope, cashout_id: i64) -> AppResult<CashoutItem> {
        let txn = self.pool.begin().await?;
        let cashout = Self::transition_cashout(
            &txn,
            scope,
            cashout_id,
            CashoutStatus::Approved,
            CashoutStatus::Paid,
            None,
        )
        .await?;

        let settled = commissions::Entity::find()
            .filter(commissions::Column::UserId.eq(cashout.user_id.as_str()))
            .filter(commissions::Column::Status.eq(CommissionStatus::Settled))
            .order_by_asc(commissions::Column::CreatedAt)
            .order_by_asc(commissions::Column::Id)
            .all(&txn)
            .await?;

        let ids = pick_commissions_to_withdraw(&settled, cashout.amount);
        if !ids.is_empty() {
            let now = Utc::now();
            commissions::Entity::update_many()
                .col_expr(
                    commissions::Column::Status,
                    Expr::value(CommissionStatus::Withdrawn),
                )
                .col_expr(commissions::Column::CashoutTime, Expr::value(now))
                .col_expr(commissions::Column::UpdatedAt, Expr::value(now))
                .filter(commissions::Column::Id.is_in(ids.clone()))
                .filter(commissions::Column::Status.eq(CommissionStatus::Settled))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        log::info!(
            "Cashout {cashout_id} paid, {} commissions withdrawn",
            ids.len()
        );
        Ok(cashout.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use crate::entities::PayStatus;
    use crate::entities::RefundStatus;
    use chrono::{Duration, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn commission(id: i64, amount: f64, status: CommissionStatus) -> commissions::Model {
        let now = Utc::now();
        commissions::Model {
            id,
            user_id: "referrer0000000000000001".into(),
            order_id: id,
            order_no: format!("ORDER2025610{id:06}"),
            amount,
            rate: COMMISSION_RATE,
            status,
            cashout_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn cashout(id: i64, amount: f64, status: CashoutStatus) -> cashouts::Model {
        let now = Utc::now();
        cashouts::Model {
            id,
            user_id: "referrer0000000000000001".into(),
            amount,
            method: CashoutMethod::Wechat,
            account: "wx_account".into(),
            status,
            remark: None,
            process_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn paid_order_with_referrer() -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: 7,
            order_no: "ORDER20256101234567".into(),
            user_id: "buyer0000000000000000001".into(),
            service_id: 1,
            patient_id: 1,
            address_id: 1,
            appointment_date: "2025-06-11".into(),
            appointment_time: "08:00".into(),
            disease_info: None,
            need_toilet_assist: 0,
            service_name: "陪诊".into(),
            price: 100.0,
            quantity: 2,
            total_amount: 200.0,
            form_data: None,
            status: OrderStatus::Paid,
            pay_status: PayStatus::Paid,
            pay_deadline: Some(now + Duration::minutes(30)),
            pay_time: Some(now),
            pay_method: Some("wechat".into()),
            transaction_id: Some("TXN20250610120000123456".into()),
            refund_status: RefundStatus::None,
            refund_time: None,
            refund_amount: 0.0,
            refund_reason: None,
            remark: None,
            referrer_id: Some("referrer0000000000000001".into()),
            commission: 10.0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_calculate_commission() {
        assert_eq!(calculate_commission(200.0), 10.0);
        assert_eq!(calculate_commission(0.0), 0.0);
        assert_eq!(calculate_commission(150.0), 7.5);
    }

    #[test]
    fn test_available_balance_reserves_in_flight_cashouts() {
        let rows = vec![
            commission(1, 10.0, CommissionStatus::Settled),
            commission(2, 15.0, CommissionStatus::Settled),
            commission(3, 50.0, CommissionStatus::Pending),
            commission(4, 5.0, CommissionStatus::Withdrawn),
        ];
        let outs = vec![
            cashout(1, 5.0, CashoutStatus::Paid),
            cashout(2, 12.0, CashoutStatus::Pending),
            cashout(3, 3.0, CashoutStatus::Approved),
            cashout(4, 100.0, CashoutStatus::Rejected),
        ];
        // (10 + 15) - (12 + 3)
        assert_eq!(available_balance(&rows, &outs), 10.0);
    }

    #[test]
    fn test_balance_never_exceeds_settled_after_overshooting_payout() {
        let mut rows = vec![
            commission(1, 10.0, CommissionStatus::Settled),
            commission(2, 10.0, CommissionStatus::Settled),
            commission(3, 10.0, CommissionStatus::Settled),
        ];
        // 到账 12 元会整行扣减 1、2 两笔，共 20 元
        let withdrawn = pick_commissions_to_withdraw(&rows, 12.0);
        assert_eq!(withdrawn, vec![1, 2]);
        for c in rows.iter_mut().filter(|c| withdrawn.contains(&c.id)) {
            c.status = CommissionStatus::Withdrawn;
        }
        let outs = vec![cashout(1, 12.0, CashoutStatus::Paid)];

        let settled: f64 = rows
            .iter()
            .filter(|c| c.status == CommissionStatus::Settled)
            .map(|c| c.amount)
            .sum();
        let balance = available_balance(&rows, &outs);
        assert_eq!(settled, 10.0);
        assert_eq!(balance, 10.0);
        assert!(balance <= settled);
    }

    #[test]
    fn test_compute_stats() {
        let now = Local.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let mut old = commission(1, 4.0, CommissionStatus::Settled);
        old.created_at = Local
            .with_ymd_and_hms(2025, 5, 20, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let mut month = commission(2, 6.0, CommissionStatus::Withdrawn);
        month.created_at = Local
            .with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        let mut today = commission(3, 10.0, CommissionStatus::Pending);
        today.created_at = now.with_timezone(&Utc);

        let stats = compute_stats(&[old, month, today], now);
        assert_eq!(stats.total_income, 20.0);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.month_income, 16.0);
        assert_eq!(stats.month_orders, 2);
        assert_eq!(stats.today_income, 10.0);
        assert_eq!(stats.today_orders, 1);
        assert_eq!(stats.pending_amount, 10.0);
        assert_eq!(stats.settled_amount, 4.0);
        assert_eq!(stats.withdrawn_amount, 6.0);
    }

    #[test]
    fn test_pick_commissions_to_withdraw() {
        let settled = vec![
            commission(1, 6.0, CommissionStatus::Settled),
            commission(2, 6.0, CommissionStatus::Settled),
            commission(3, 6.0, CommissionStatus::Settled),
        ];
        assert_eq!(pick_commissions_to_withdraw(&settled, 12.0), vec![1, 2]);
        assert_eq!(pick_commissions_to_withdraw(&settled, 12.5), vec![1, 2, 3]);
        assert!(pick_commissions_to_withdraw(&settled, 0.0).is_empty());
    }

    #[tokio::test]
    async fn test_create_commission_for_paid_order() {
        let order = paid_order_with_referrer();
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .append_query_results([vec![commission(1, 10.0, CommissionStatus::Pending)]])
            .into_pool();

        let created = CommissionService::create_for_paid_order(db.as_ref(), &order)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(created.amount, 10.0);
        assert_eq!(created.status, CommissionStatus::Pending);
        assert_eq!(created.user_id, "referrer0000000000000001");
    }

    #[tokio::test]
    async fn test_no_commission_without_referrer() {
        let mut order = paid_order_with_referrer();
        order.referrer_id = Some(String::new());
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        assert!(
            CommissionService::create_for_paid_order(db.as_ref(), &order)
                .await
                .unwrap()
                .is_none()
        );

        order.referrer_id = Some("referrer0000000000000001".into());
        order.commission = 0.0;
        assert!(
            CommissionService::create_for_paid_order(db.as_ref(), &order)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cashout_below_minimum_rejected_regardless_of_balance() {
        // 未准备任何查询结果：若触达数据库会报错
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let service = CommissionService::new(db);
        let req = ApplyCashoutRequest {
            amount: Some(5.0),
            method: Some("wechat".into()),
            account: Some("wx_account".into()),
        };
        let err = service
            .apply_cashout("referrer0000000000000001", &req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));
    }

    #[tokio::test]
    async fn test_cashout_above_balance_rejected() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![commission(1, 12.0, CommissionStatus::Settled)]])
            .append_query_results([Vec::<cashouts::Model>::new()])
            .into_pool();
        let service = CommissionService::new(db);
        let req = ApplyCashoutRequest {
            amount: Some(20.0),
            method: Some("alipay".into()),
            account: Some("13800000000".into()),
        };
        let err = service
            .apply_cashout("referrer0000000000000001", &req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(msg) if msg.contains("12.00")));
    }

    #[tokio::test]
    async fn test_cashout_rejected_beyond_remaining_settled_after_payout() {
        // 已到账提现不再占用余额，但已提现佣金也不再计入
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![commission(3, 10.0, CommissionStatus::Settled)]])
            .append_query_results([Vec::<cashouts::Model>::new()])
            .into_pool();
        let service = CommissionService::new(db.clone());
        let req = ApplyCashoutRequest {
            amount: Some(15.0),
            method: Some("wechat".into()),
            account: Some("wx_account".into()),
        };
        let err = service
            .apply_cashout("referrer0000000000000001", &req)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(msg) if msg.contains("10.00")));

        drop(service);
        let log = transaction_log(db);
        assert!(log.contains("`commissions`.`status` = ?"));
        assert!(log.contains("`cashouts`.`status` IN (?, ?)"));
        assert!(!log.contains("INSERT"));
    }

    #[tokio::test]
    async fn test_cashout_within_balance_is_created() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![
                commission(1, 12.0, CommissionStatus::Settled),
                commission(2, 8.0, CommissionStatus::Settled),
            ]])
            .append_query_results([Vec::<cashouts::Model>::new()])
            .append_exec_results([MockExecResult {
                last_insert_id: 3,
                rows_affected: 1,
            }])
            .append_query_results([vec![cashout(3, 15.0, CashoutStatus::Pending)]])
            .into_pool();
        let service = CommissionService::new(db);
        let req = ApplyCashoutRequest {
            amount: Some(15.0),
            method: Some("wechat".into()),
            account: Some("wx_account".into()),
        };
        let resp = service
            .apply_cashout("referrer0000000000000001", &req)
            .await
            .unwrap();
        assert_eq!(resp.cashout_id, 3);
        assert_eq!(resp.status, 0);
        assert_eq!(resp.method, "wechat");
    }

    #[tokio::test]
    async fn test_cashout_missing_fields_or_bad_method() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let service = CommissionService::new(db);
        let missing = ApplyCashoutRequest {
            amount: Some(20.0),
            method: None,
            account: Some("a".into()),
        };
        assert!(matches!(
            service.apply_cashout("u", &missing).await,
            Err(AppError::ValidationError(_))
        ));
        let bad = ApplyCashoutRequest {
            amount: Some(20.0),
            method: Some("paypal".into()),
            account: Some("a".into()),
        };
        assert!(matches!(
            service.apply_cashout("u", &bad).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_requires_pending() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![cashout(1, 20.0, CashoutStatus::Paid)]])
            .into_pool();
        let service = CommissionService::new(db);
        let err = service
            .approve_cashout(&AdminScope::All, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));
    }

    #[tokio::test]
    async fn test_pay_cashout_marks_commissions_withdrawn() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![cashout(1, 12.0, CashoutStatus::Approved)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![
                commission(1, 10.0, CommissionStatus::Settled),
                commission(2, 10.0, CommissionStatus::Settled),
            ]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            }])
            .into_pool();
        let service = CommissionService::new(db.clone());
        let item = service.pay_cashout(&AdminScope::All, 1).await.unwrap();
        assert_eq!(item.status, CashoutStatus::Paid.to_value());
        assert_eq!(item.status_text, "已到账");

        drop(service);
        let log = transaction_log(db);
        assert!(log.contains("UPDATE `commissions`"));
    }
}
