use crate::database::DbPool;
use crate::entities::{
    OrderStatus, admin_login_log_entity as login_logs, order_entity as orders,
    referral_entity as referrals, user_entity as users,
};
use crate::entities::users::{ADMIN_LEVEL_SUB, ADMIN_LEVEL_SUPER};
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminCheckResponse, AdminItem, AdminLoginRequest, AdminLoginResponse, AdminOrderItem,
    AdminPageQuery, AdminProfile, AdminStats, LoginLogItem, PaginatedResponse, Pagination,
    RemoveAdminRequest, SetAdminRequest, UserInfo,
};
use crate::utils::id_generator::is_valid_user_id;
use crate::utils::jwt::{JwtService, ROLE_ADMIN};
use crate::utils::money::round2;
use crate::utils::password::{hash_password, validate_password, verify_password};
use chrono::{Local, TimeZone, Utc};
use sea_orm::sea_query::{ConditionalStatement, Expr, Query};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashMap;

const LOGIN_SUCCESS: i32 = 1;
const LOGIN_FAILED: i32 = 0;

/// 管理员可见范围：超管看全部，子管理员只看自己推荐的用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminScope {
    All,
    Referrals(String),
}

impl AdminScope {
    pub fn for_admin(admin: &users::Model) -> Self {
        if admin.is_super_admin() {
            AdminScope::All
        } else {
            AdminScope::Referrals(admin.user_id.clone())
        }
    }

    /// 作用在任意 user_id 列上的可见性条件
    pub fn user_condition<C: ColumnTrait>(&self, col: C) -> Condition {
        match self {
            AdminScope::All => Condition::all(),
            AdminScope::Referrals(admin_id) => Condition::all().add(
                col.in_subquery(
                    Query::select()
                        .column(referrals::Column::UserId)
                        .from(referrals::Entity)
                        .and_where(referrals::Column::ReferrerId.eq(admin_id.as_str()))
                        .to_owned(),
                ),
            ),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct SumRow {
    total: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct ReferrerSumRow {
    referrer_id: Option<String>,
    total: Option<f64>,
}

#[derive(Clone)]
pub struct AdminService {
    pool: DbPool,
    jwt_service: JwtService,
}

impl AdminService {
    pub fn new(pool: DbPool, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    /// 从数据库重新确认管理员身份（令牌里的角色不作为依据）
    pub async fn require_admin(&self, user_id: &str) -> AppResult<(users::Model, AdminScope)> {
        let admin = users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .filter(|u| u.is_admin)
            .ok_or(AppError::PermissionDenied)?;
        let scope = AdminScope::for_admin(&admin);
        Ok((admin, scope))
    }

    pub async fn require_super_admin(&self, user_id: &str) -> AppResult<users::Model> {
        let (admin, _) = self.require_admin(user_id).await?;
        if !admin.is_super_admin() {
            return Err(AppError::PermissionDenied);
        }
        Ok(admin)
    }

    async fn write_login_log(
        &self,
        admin_user_id: Option<String>,
        username: &str,
        login_ip: Option<String>,
        user_agent: Option<String>,
        status: i32,
    ) {
        let log_row = login_logs::ActiveModel {
            admin_user_id: Set(admin_user_id),
            username: Set(username.to_string()),
            login_ip: Set(login_ip),
            user_agent: Set(user_agent),
            status: Set(status),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        // 日志写入失败不影响登录结果
        if let Err(e) = log_row.insert(self.pool.as_ref()).await {
            log::error!("Failed to write admin login log for {username}: {e}");
        }
    }

    /// 管理员账号密码登录，成功与失败都记录登录日志
    pub async fn login(
        &self,
        req: AdminLoginRequest,
        login_ip: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<AdminLoginResponse> {
        let username = req.username.trim();
        if username.is_empty() || req.password.is_empty() {
            return Err(AppError::ValidationError("用户名和密码不能为空".into()));
        }

        let admin = users::Entity::find()
            .filter(users::Column::AdminUsername.eq(username))
            .filter(users::Column::IsAdmin.eq(true))
            .one(self.pool.as_ref())
            .await?;

        let verified = admin.filter(|a| {
            a.admin_password
                .as_deref()
                .is_some_and(|hash| verify_password(&req.password, hash))
        });

        let Some(admin) = verified else {
            self.write_login_log(None, username, login_ip, user_agent, LOGIN_FAILED)
                .await;
            log::warn!("Admin login failed for {username}");
            return Err(AppError::AuthError("用户名或密码错误".into()));
        };

        let now = Utc::now();
        users::Entity::update_many()
            .col_expr(users::Column::LastLoginAt, Expr::value(now))
            .filter(users::Column::Id.eq(admin.id))
            .exec(self.pool.as_ref())
            .await?;

        self.write_login_log(
            Some(admin.user_id.clone()),
            username,
            login_ip,
            user_agent,
            LOGIN_SUCCESS,
        )
        .await;

        let token =
            self.jwt_service
                .generate_access_token(&admin.user_id, ROLE_ADMIN, admin.admin_level)?;
        let refresh_token =
            self.jwt_service
                .generate_refresh_token(&admin.user_id, ROLE_ADMIN, admin.admin_level)?;

        log::info!("Admin {} logged in, level {}", admin.user_id, admin.admin_level);
        Ok(AdminLoginResponse {
            token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
            user_info: AdminProfile::from(&admin),
        })
    }

    pub async fn check(&self, user_id: &str) -> AppResult<AdminCheckResponse> {
        let user = users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;

        Ok(AdminCheckResponse {
            is_admin: user.is_admin,
            admin_level: if user.is_admin { user.admin_level } else { 0 },
            is_super_admin: user.is_super_admin(),
            user_info: UserInfo::from(user),
        })
    }

    pub async fn users(
        &self,
        scope: &AdminScope,
        query: &AdminPageQuery,
    ) -> AppResult<PaginatedResponse<UserInfo>> {
        let pagination = Pagination::new(query.page, query.page_size, 20, 100);
        let select = users::Entity::find().filter(scope.user_condition(users::Column::UserId));

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .limit(pagination.limit())
            .offset(pagination.offset())
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            rows.into_iter().map(UserInfo::from).collect(),
            pagination,
            total,
        ))
    }

    pub async fn orders(
        &self,
        scope: &AdminScope,
        query: &AdminPageQuery,
    ) -> AppResult<PaginatedResponse<AdminOrderItem>> {
        let pagination = Pagination::new(query.page, query.page_size, 20, 100);
        let mut select =
            orders::Entity::find().filter(scope.user_condition(orders::Column::UserId));
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

        let user_ids: Vec<String> = rows.iter().map(|o| o.user_id.clone()).collect();
        let nick_names: HashMap<String, String> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            users::Entity::find()
                .filter(users::Column::UserId.is_in(user_ids))
                .all(self.pool.as_ref())
                .await?
                .into_iter()
                .map(|u| (u.user_id, u.nick_name))
                .collect()
        };

        let list = rows
            .into_iter()
            .map(|o| AdminOrderItem {
                user_nick_name: nick_names.get(&o.user_id).cloned().unwrap_or_default(),
                status: o.status.to_value(),
                status_text: o.status.text().to_string(),
                pay_status: o.pay_status.to_value(),
                refund_status: o.refund_status.to_value(),
                id: o.id,
                order_no: o.order_no,
                user_id: o.user_id,
                service_name: o.service_name,
                appointment_date: o.appointment_date,
                appointment_time: o.appointment_time,
                total_amount: o.total_amount,
                refund_amount: o.refund_amount,
                referrer_id: o.referrer_id,
                commission: o.commission,
                created_at: o.created_at,
            })
            .collect();

        Ok(PaginatedResponse::new(list, pagination, total))
    }

    async fn sum_orders(
        &self,
        scope: &AdminScope,
        column: orders::Column,
        statuses: &[OrderStatus],
    ) -> AppResult<f64> {
        let mut select = orders::Entity::find().filter(scope.user_condition(orders::Column::UserId));
        if !statuses.is_empty() {
            select = select.filter(orders::Column::Status.is_in(statuses.iter().copied()));
        }
        let row = select
            .select_only()
            .column_as(column.sum(), "total")
            .into_model::<SumRow>()
            .one(self.pool.as_ref())
            .await?;
        Ok(round2(row.and_then(|r| r.total).unwrap_or(0.0)))
    }

    /// 统计数据，按管理员可见范围过滤
    pub async fn stats(&self, scope: &AdminScope) -> AppResult<AdminStats> {
        let total_users = users::Entity::find()
            .filter(scope.user_condition(users::Column::UserId))
            .count(self.pool.as_ref())
            .await?;

        let scoped_orders =
            orders::Entity::find().filter(scope.user_condition(orders::Column::UserId));
        let total_orders = scoped_orders.clone().count(self.pool.as_ref()).await?;

        let today_start = Local::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|t| Local.from_local_datetime(&t).earliest())
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| AppError::InternalError("无法计算当日起始时间".into()))?;
        let today_orders = scoped_orders
            .filter(orders::Column::CreatedAt.gte(today_start))
            .count(self.pool.as_ref())
            .await?;

        Ok(AdminStats {
            total_users,
            total_orders,
            today_orders,
            total_amount: self
                .sum_orders(scope, orders::Column::TotalAmount, &[])
                .await?,
            paid_amount: self
                .sum_orders(
                    scope,
                    orders::Column::TotalAmount,
                    &[OrderStatus::Paid, OrderStatus::Completed],
                )
                .await?,
            unpaid_amount: self
                .sum_orders(scope, orders::Column::TotalAmount, &[OrderStatus::Pending])
                .await?,
            refund_amount: self
                .sum_orders(scope, orders::Column::RefundAmount, &[OrderStatus::Refunded])
                .await?,
        })
    }

    /// 设置管理员（仅超管）
    pub async fn set_admin(&self, operator_id: &str, req: SetAdminRequest) -> AppResult<AdminItem> {
        let operator = self.require_super_admin(operator_id).await?;

        if req.admin_level != ADMIN_LEVEL_SUB && req.admin_level != ADMIN_LEVEL_SUPER {
            return Err(AppError::ValidationError("管理员级别只能是1或2".into()));
        }
        let username = req.username.trim();
        if username.is_empty() {
            return Err(AppError::ValidationError("用户名不能为空".into()));
        }
        validate_password(&req.password)?;
        if !is_valid_user_id(&req.user_id) {
            return Err(AppError::ValidationError("用户ID格式错误".into()));
        }

        let user = users::Entity::find()
            .filter(users::Column::UserId.eq(req.user_id.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".into()))?;
        if user.is_admin {
            return Err(AppError::BusinessError("该用户已经是管理员".into()));
        }

        let taken = users::Entity::find()
            .filter(users::Column::AdminUsername.eq(username))
            .count(self.pool.as_ref())
            .await?
            > 0;
        if taken {
            return Err(AppError::BusinessError("用户名已存在".into()));
        }

        let now = Utc::now();
        let mut active: users::ActiveModel = user.into();
        active.is_admin = Set(true);
        active.admin_level = Set(req.admin_level);
        active.parent_admin_id = Set(Some(operator.user_id.clone()));
        active.admin_username = Set(Some(username.to_string()));
        active.admin_password = Set(Some(hash_password(&req.password)?));
        active.admin_created_at = Set(Some(now));
        active.updated_at = Set(now);
        let admin = active.update(self.pool.as_ref()).await?;

        log::info!(
            "Admin {} granted level {} by {}",
            admin.user_id,
            admin.admin_level,
            operator.user_id
        );
        Ok(admin_item(admin, 0.0))
    }

    /// 移除管理员（仅超管，不能移除自己）
    pub async fn remove_admin(&self, operator_id: &str, req: RemoveAdminRequest) -> AppResult<()> {
        let operator = self.require_super_admin(operator_id).await?;
        if operator.user_id == req.user_id {
            return Err(AppError::BusinessError("不能移除自己的管理员权限".into()));
        }
        if !is_valid_user_id(&req.user_id) {
            return Err(AppError::ValidationError("用户ID格式错误".into()));
        }

        let result = users::Entity::update_many()
            .col_expr(users::Column::IsAdmin, Expr::value(false))
            .col_expr(users::Column::AdminLevel, Expr::value(0))
            .col_expr(users::Column::ParentAdminId, Expr::value(Option::<String>::None))
            .col_expr(users::Column::AdminUsername, Expr::value(Option::<String>::None))
            .col_expr(users::Column::AdminPassword, Expr::value(Option::<String>::None))
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::UserId.eq(req.user_id.as_str()))
            .filter(users::Column::IsAdmin.eq(true))
            .exec(self.pool.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("管理员不存在".into()));
        }
        log::info!("Admin {} removed by {}", req.user_id, operator.user_id);
        Ok(())
    }

    /// 管理员列表：超管看全部，子管理员看自己创建的
    pub async fn admins(&self, admin: &users::Model) -> AppResult<Vec<AdminItem>> {
        let mut select = users::Entity::find().filter(users::Column::IsAdmin.eq(true));
        if !admin.is_super_admin() {
            select = select.filter(users::Column::ParentAdminId.eq(admin.user_id.as_str()));
        }
        let rows = select
            .order_by_desc(users::Column::AdminLevel)
            .order_by_asc(users::Column::AdminCreatedAt)
            .all(self.pool.as_ref())
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|u| u.user_id.clone()).collect();
        let totals: HashMap<String, f64> = orders::Entity::find()
            .filter(orders::Column::ReferrerId.is_in(ids))
            .select_only()
            .column(orders::Column::ReferrerId)
            .column_as(orders::Column::TotalAmount.sum(), "total")
            .group_by(orders::Column::ReferrerId)
            .into_model::<ReferrerSumRow>()
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .filter_map(|r| Some((r.referrer_id?, round2(r.total.unwrap_or(0.0)))))
            .collect();

        Ok(rows
            .into_iter()
            .map(|u| {
                let total = totals.get(&u.user_id).copied().unwrap_or(0.0);
                admin_item(u, total)
            })
            .collect())
    }

    pub async fn login_logs(
        &self,
        admin_user_id: &str,
        query: &AdminPageQuery,
    ) -> AppResult<PaginatedResponse<LoginLogItem>> {
        let pagination = Pagination::new(query.page, query.page_size, 20, 100);
        let select = login_logs::Entity::find()
            .filter(login_logs::Column::AdminUserId.eq(admin_user_id));

        let total = select.clone().count(self.pool.as_ref()).await?;
        let rows = select
            .order_by_desc(login_logs::Column::CreatedAt)
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
}

fn admin_item(u: users::Model, total_amount: f64) -> AdminItem {
    AdminItem {
        user_id: u.user_id,
        username: u.admin_username,
        nick_name: u.nick_name,
        avatar_url: u.avatar_url,
        phone: u.phone,
        admin_level: u.admin_level,
        parent_admin_id: u.parent_admin_id,
        admin_created_at: u.admin_created_at,
        last_login_at: u.last_login_at,
        total_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};
    use std::collections::BTreeMap;

    fn user(user_id: &str, is_admin: bool, level: i32) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: 1,
            user_id: user_id.into(),
            open_id: format!("open_{user_id}"),
            union_id: None,
            nick_name: "测试".into(),
            avatar_url: String::new(),
            gender: 0,
            phone: None,
            country: String::new(),
            province: String::new(),
            city: String::new(),
            language: "zh_CN".into(),
            session_key: None,
            is_admin,
            admin_level: level,
            parent_admin_id: None,
            admin_username: is_admin.then(|| "admin".to_string()),
            admin_password: None,
            admin_created_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600, 7200)
    }

    #[test]
    fn test_scope_from_level() {
        assert_eq!(
            AdminScope::for_admin(&user("a", true, ADMIN_LEVEL_SUPER)),
            AdminScope::All
        );
        assert_eq!(
            AdminScope::for_admin(&user("b", true, ADMIN_LEVEL_SUB)),
            AdminScope::Referrals("b".into())
        );
    }

    #[test]
    fn test_sub_admin_scope_uses_referral_subquery() {
        let sql = users::Entity::find()
            .filter(AdminScope::Referrals("sub1".into()).user_condition(users::Column::UserId))
            .build(DatabaseBackend::MySql)
            .to_string();
        assert!(sql.contains("IN (SELECT `user_id` FROM `referrals`"));
        assert!(sql.contains("`referrer_id` = 'sub1'"));

        let all_sql = users::Entity::find()
            .filter(AdminScope::All.user_condition(users::Column::UserId))
            .build(DatabaseBackend::MySql)
            .to_string();
        assert!(!all_sql.contains("referrals"));
    }

    #[tokio::test]
    async fn test_require_admin_rejects_plain_user() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user("u1", false, 0)]])
            .into_pool();
        let svc = AdminService::new(db, jwt());
        assert!(matches!(
            svc.require_admin("u1").await,
            Err(AppError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_logs_failure() {
        let mut admin = user("a1", true, ADMIN_LEVEL_SUPER);
        admin.admin_password = Some(hash_password("secret123").unwrap());
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![admin]])
            .append_exec_results([MockExecResult {
                last_insert_id: 1,
                rows_affected: 1,
            }])
            .append_query_results([vec![login_logs::Model {
                id: 1,
                admin_user_id: None,
                username: "admin".into(),
                login_ip: None,
                user_agent: None,
                status: LOGIN_FAILED,
                created_at: now,
            }]])
            .into_pool();

        let svc = AdminService::new(db.clone(), jwt());
        let err = svc
            .login(
                AdminLoginRequest {
                    username: "admin".into(),
                    password: "wrong999".into(),
                },
                Some("127.0.0.1".into()),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));

        drop(svc);
        let log = transaction_log(db);
        assert!(log.contains("INSERT INTO `admin_login_logs`"));
    }

    #[tokio::test]
    async fn test_remove_self_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user("a1", true, ADMIN_LEVEL_SUPER)]])
            .into_pool();
        let svc = AdminService::new(db, jwt());
        let err = svc
            .remove_admin(
                "a1",
                RemoveAdminRequest {
                    user_id: "a1".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BusinessError(_)));
    }

    #[tokio::test]
    async fn test_sub_admin_cannot_set_admin() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![user("s1", true, ADMIN_LEVEL_SUB)]])
            .into_pool();
        let svc = AdminService::new(db, jwt());
        let err = svc
            .set_admin(
                "s1",
                SetAdminRequest {
                    user_id: "u2".into(),
                    admin_level: 1,
                    username: "sub2".into(),
                    password: "secret123".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_stats_sums_amounts() {
        fn count(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
            BTreeMap::from([("num_items", sea_orm::Value::Int(Some(n as i32)))])
        }
        fn sum(v: f64) -> BTreeMap<&'static str, sea_orm::Value> {
            BTreeMap::from([("total", sea_orm::Value::Double(Some(v)))])
        }
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![count(3)], vec![count(5)], vec![count(2)]])
            .append_query_results([vec![sum(500.0)], vec![sum(300.0)], vec![sum(150.0)], vec![
                sum(50.0),
            ]])
            .into_pool();
        let svc = AdminService::new(db, jwt());
        let stats = svc.stats(&AdminScope::All).await.unwrap();
        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_orders, 5);
        assert_eq!(stats.today_orders, 2);
        assert_eq!(stats.total_amount, 500.0);
        assert_eq!(stats.paid_amount, 300.0);
        assert_eq!(stats.unpaid_amount, 150.0);
        assert_eq!(stats.refund_amount, 50.0);
    }
}
