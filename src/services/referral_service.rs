use crate::database::DbPool;
use crate::entities::{referral_entity as referrals, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    BindReferrerResponse, CommissionItem, GenerateCodesResponse, PromoterInfoResponse,
    PromoterPublicInfo, QrcodeResponse, ReferralConfigResponse, ReferralReportResponse,
    ReferralUserItem,
};
use crate::services::{COMMISSION_RATE, CommissionService, MIN_CASHOUT};
use crate::utils::promoter_code::{
    format_promoter_code, generate_unique_promoter_code, validate_promoter_code,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

const REFERRAL_ACTIVE: i32 = 1;
/// 推荐报表最多返回的下级用户数
const REPORT_REFERRAL_LIMIT: u64 = 100;

pub fn qr_code_url(base_url: &str, user_id: &str) -> String {
    format!("{}/user_{user_id}.png", base_url.trim_end_matches('/'))
}

fn user_item(u: users::Model) -> ReferralUserItem {
    ReferralUserItem {
        user_id: u.user_id,
        nick_name: u.nick_name,
        avatar_url: u.avatar_url,
        created_at: u.created_at,
    }
}

async fn code_exists<C: ConnectionTrait>(conn: &C, code: String) -> AppResult<bool> {
    Ok(referrals::Entity::find()
        .filter(referrals::Column::PromoterCode.eq(code))
        .count(conn)
        .await?
        > 0)
}

#[derive(Clone)]
pub struct ReferralService {
    pool: DbPool,
    commission_service: CommissionService,
    qrcode_base_url: String,
}

impl ReferralService {
    pub fn new(
        pool: DbPool,
        commission_service: CommissionService,
        qrcode_base_url: &str,
    ) -> Self {
        Self {
            pool,
            commission_service,
            qrcode_base_url: qrcode_base_url.to_string(),
        }
    }

    async fn unique_code(&self) -> AppResult<String> {
        let pool = self.pool.clone();
        generate_unique_promoter_code(move |code| {
            let pool = pool.clone();
            async move { code_exists(pool.as_ref(), code).await }
        })
        .await
    }

    async fn find_referral(&self, user_id: &str) -> AppResult<Option<referrals::Model>> {
        Ok(referrals::Entity::find()
            .filter(referrals::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?)
    }

    /// 获取推荐关系，不存在则创建；缺推广码时补发
    pub async fn ensure_referral(&self, user_id: &str) -> AppResult<referrals::Model> {
        let now = Utc::now();
        match self.find_referral(user_id).await? {
            Some(existing) if existing.promoter_code.as_deref().is_some_and(|c| !c.is_empty()) => {
                Ok(existing)
            }
            Some(existing) => {
                let code = self.unique_code().await?;
                let mut active: referrals::ActiveModel = existing.into();
                active.promoter_code = Set(Some(code));
                active.qr_code_url = Set(Some(qr_code_url(&self.qrcode_base_url, user_id)));
                active.updated_at = Set(now);
                Ok(active.update(self.pool.as_ref()).await?)
            }
            None => {
                let code = self.unique_code().await?;
                let model = referrals::ActiveModel {
                    user_id: Set(user_id.to_string()),
                    referrer_id: Set(None),
                    promoter_code: Set(Some(code)),
                    qr_code_url: Set(Some(qr_code_url(&self.qrcode_base_url, user_id))),
                    status: Set(REFERRAL_ACTIVE),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(self.pool.as_ref())
                .await?;
                log::info!(
                    "Referral created for {user_id} with code {:?}",
                    model.promoter_code
                );
                Ok(model)
            }
        }
    }

    pub async fn promoter_info(&self, user_id: &str) -> AppResult<PromoterInfoResponse> {
        let referral = self.ensure_referral(user_id).await?;
        let stats = self.commission_service.stats(user_id).await?;
        let promoter_code = referral.promoter_code.unwrap_or_default();

        Ok(PromoterInfoResponse {
            user_id: user_id.to_string(),
            formatted_code: format_promoter_code(&promoter_code),
            promoter_code,
            qr_code_url: referral
                .qr_code_url
                .unwrap_or_else(|| qr_code_url(&self.qrcode_base_url, user_id)),
            referrer_id: referral.referrer_id,
            stats,
        })
    }

    /// 按推广码查找持有人，返回其公开信息
    pub async fn by_code(&self, code: &str) -> AppResult<PromoterPublicInfo> {
        let code = code.trim().to_uppercase();
        if !validate_promoter_code(&code) {
            return Err(AppError::ValidationError("推广码格式不正确".into()));
        }

        let referral = referrals::Entity::find()
            .filter(referrals::Column::PromoterCode.eq(code.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("推广码不存在".into()))?;

        let owner = users::Entity::find()
            .filter(users::Column::UserId.eq(referral.user_id.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("推广员不存在".into()))?;

        Ok(PromoterPublicInfo {
            user_id: owner.user_id,
            nick_name: owner.nick_name,
            avatar_url: owner.avatar_url,
            formatted_code: format_promoter_code(&code),
            promoter_code: code,
        })
    }

    /// 绑定推荐人：只能绑定一次，且不能绑定自己
    pub async fn bind(&self, user_id: &str, promoter_code: &str) -> AppResult<BindReferrerResponse> {
        let promoter = self.by_code(promoter_code).await?;
        if promoter.user_id == user_id {
            return Err(AppError::BusinessError("不能绑定自己为推荐人".into()));
        }

        let referral = self.ensure_referral(user_id).await?;
        if referral.referrer_id.as_deref().is_some_and(|r| !r.is_empty()) {
            return Err(AppError::BusinessError("已绑定推荐人".into()));
        }

        let result = referrals::Entity::update_many()
            .col_expr(
                referrals::Column::ReferrerId,
                Expr::value(promoter.user_id.clone()),
            )
            .col_expr(referrals::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(referrals::Column::Id.eq(referral.id))
            .filter(
                Condition::any()
                    .add(referrals::Column::ReferrerId.is_null())
                    .add(referrals::Column::ReferrerId.eq("")),
            )
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::BusinessError("已绑定推荐人".into()));
        }

        log::info!("User {user_id} bound referrer {}", promoter.user_id);
        Ok(BindReferrerResponse {
            referrer_id: promoter.user_id,
            message: "绑定成功".into(),
        })
    }

    /// 首次登录携带推广码时绑定，失败只记录日志不影响登录
    pub async fn bind_on_login(&self, user_id: &str, promoter_code: Option<&str>) {
        let Some(code) = promoter_code.map(str::trim).filter(|c| !c.is_empty()) else {
            return;
        };
        if let Err(e) = self.bind(user_id, code).await {
            log::warn!("Bind referrer on login failed for {user_id} with code {code}: {e}");
        }
    }

    pub async fn qrcode(&self, user_id: &str) -> AppResult<QrcodeResponse> {
        let referral = self.ensure_referral(user_id).await?;
        Ok(QrcodeResponse {
            qr_code_url: referral
                .qr_code_url
                .unwrap_or_else(|| qr_code_url(&self.qrcode_base_url, user_id)),
            promoter_code: referral.promoter_code.unwrap_or_default(),
        })
    }

    pub async fn report(&self, user_id: &str) -> AppResult<ReferralReportResponse> {
        let referrer = match self.find_referral(user_id).await?.and_then(|r| r.referrer_id) {
            Some(referrer_id) => users::Entity::find()
                .filter(users::Column::UserId.eq(referrer_id))
                .one(self.pool.as_ref())
                .await?
                .map(user_item),
            None => None,
        };

        let referred_ids: Vec<String> = referrals::Entity::find()
            .filter(referrals::Column::ReferrerId.eq(user_id))
            .order_by_desc(referrals::Column::CreatedAt)
            .limit(REPORT_REFERRAL_LIMIT)
            .all(self.pool.as_ref())
            .await?
            .into_iter()
            .map(|r| r.user_id)
            .collect();

        let referrals_list = if referred_ids.is_empty() {
            Vec::new()
        } else {
            users::Entity::find()
                .filter(users::Column::UserId.is_in(referred_ids))
                .order_by_desc(users::Column::CreatedAt)
                .all(self.pool.as_ref())
                .await?
                .into_iter()
                .map(user_item)
                .collect()
        };

        let commissions: Vec<CommissionItem> = self
            .commission_service
            .user_commissions(user_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let total_commission = self.commission_service.total_settled(user_id).await?;

        Ok(ReferralReportResponse {
            referrer,
            referrals: referrals_list,
            commissions,
            total_commission,
        })
    }

    pub fn config(&self) -> ReferralConfigResponse {
        ReferralConfigResponse {
            commission_rate: COMMISSION_RATE,
            min_cashout: MIN_CASHOUT,
            rules: vec![
                format!(
                    "好友通过您的推广码下单并支付后，您可获得订单金额{:.0}%的佣金",
                    COMMISSION_RATE * 100.0
                ),
                "佣金在订单服务完成并结算后可提现".to_string(),
                format!("单次提现金额不低于{MIN_CASHOUT:.0}元"),
                "提现申请审核通过后1-3个工作日到账".to_string(),
            ],
        }
    }

    /// 为缺少推广码的用户批量补发（含尚无推荐关系记录的用户）
    pub async fn generate_missing_codes(&self) -> AppResult<GenerateCodesResponse> {
        let mut generated = 0u64;

        let missing = referrals::Entity::find()
            .filter(
                sea_orm::Condition::any()
                    .add(referrals::Column::PromoterCode.is_null())
                    .add(referrals::Column::PromoterCode.eq("")),
            )
            .all(self.pool.as_ref())
            .await?;
        for referral in missing {
            self.ensure_referral(&referral.user_id).await?;
            generated += 1;
        }

        let with_referral = referrals::Entity::find()
            .select_only()
            .column(referrals::Column::UserId)
            .into_tuple::<String>()
            .all(self.pool.as_ref())
            .await?;
        let without_referral = users::Entity::find()
            .filter(users::Column::UserId.is_not_in(with_referral))
            .all(self.pool.as_ref())
            .await?;
        for user in without_referral {
            self.ensure_referral(&user.user_id).await?;
            generated += 1;
        }

        log::info!("Generated {generated} missing promoter codes");
        Ok(GenerateCodesResponse { generated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn referral(user_id: &str, code: Option<&str>, referrer: Option<&str>) -> referrals::Model {
        let now = Utc::now();
        referrals::Model {
            id: 1,
            user_id: user_id.into(),
            referrer_id: referrer.map(String::from),
            promoter_code: code.map(String::from),
            qr_code_url: None,
            status: REFERRAL_ACTIVE,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(user_id: &str) -> users::Model {
        let now = Utc::now();
        users::Model {
            id: 1,
            user_id: user_id.into(),
            open_id: format!("open_{user_id}"),
            union_id: None,
            nick_name: "推广员".into(),
            avatar_url: String::new(),
            gender: 0,
            phone: None,
            country: String::new(),
            province: String::new(),
            city: String::new(),
            language: String::new(),
            session_key: None,
            is_admin: false,
            admin_level: 0,
            parent_admin_id: None,
            admin_username: None,
            admin_password: None,
            admin_created_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: DbPool) -> ReferralService {
        ReferralService::new(
            db.clone(),
            CommissionService::new(db),
            "https://cdn.example.com/qr/",
        )
    }

    #[test]
    fn test_qr_code_url() {
        assert_eq!(
            qr_code_url("https://cdn.example.com/qr/", "abc"),
            "https://cdn.example.com/qr/user_abc.png"
        );
    }

    #[tokio::test]
    async fn test_by_code_rejects_malformed_code() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let err = service(db).by_code("AB-12").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_bind_self_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![referral("u1", Some("ABC123"), None)]])
            .append_query_results([vec![user("u1")]])
            .into_pool();
        let err = service(db).bind("u1", "abc123").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessError(msg) if msg.contains("自己")));
    }

    #[tokio::test]
    async fn test_bind_twice_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![referral("p1", Some("ABC123"), None)]])
            .append_query_results([vec![user("p1")]])
            .append_query_results([vec![referral("u2", Some("XYZ789"), Some("p0"))]])
            .into_pool();
        let err = service(db).bind("u2", "ABC123").await.unwrap_err();
        assert!(matches!(err, AppError::BusinessError(msg) if msg.contains("已绑定")));
    }

    #[tokio::test]
    async fn test_bind_over_empty_legacy_referrer() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![referral("p1", Some("ABC123"), None)]])
            .append_query_results([vec![user("p1")]])
            .append_query_results([vec![referral("u2", Some("XYZ789"), Some(""))]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_pool();
        let resp = service(db.clone()).bind("u2", "ABC123").await.unwrap();
        assert_eq!(resp.referrer_id, "p1");

        let log = transaction_log(db);
        assert!(log.contains("`referrals`.`referrer_id` IS NULL OR `referrals`.`referrer_id` = ?"));
    }

    #[test]
    fn test_config_uses_ledger_constants() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let cfg = service(db).config();
        assert_eq!(cfg.commission_rate, 0.05);
        assert_eq!(cfg.min_cashout, 10.0);
        assert!(cfg.rules[0].contains("5%"));
    }
}
