use crate::database::DbPool;
use crate::entities::{
    patient_entity as patients, user_address_entity as addresses, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::external::WechatClient;
use crate::models::{
    AddressRequest, AddressResponse, BindPhoneRequest, LoginResponse, PatientRequest,
    PatientResponse, TokenResponse, UpdateUserInfoRequest, UserInfo, WxLoginRequest,
};
use crate::services::ReferralService;
use crate::utils::id_generator::generate_user_id;
use crate::utils::jwt::{JwtService, ROLE_ADMIN, ROLE_USER};
use crate::utils::phone::{mask_phone, validate_cn_phone};
use chrono::{Local, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

const STATUS_ACTIVE: i32 = 1;
const STATUS_DELETED: i32 = 0;

/// 非空才覆盖
fn set_if_present(target: &mut sea_orm::ActiveValue<String>, value: Option<&String>) {
    if let Some(v) = value.map(|s| s.trim()).filter(|s| !s.is_empty()) {
        *target = Set(v.to_string());
    }
}

fn role_of(user: &users::Model) -> &'static str {
    if user.is_admin { ROLE_ADMIN } else { ROLE_USER }
}

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
    jwt_service: JwtService,
    wechat: WechatClient,
    referral_service: ReferralService,
    phone_verify_code: String,
}

impl UserService {
    pub fn new(
        pool: DbPool,
        jwt_service: JwtService,
        wechat: WechatClient,
        referral_service: ReferralService,
        phone_verify_code: &str,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            wechat,
            referral_service,
            phone_verify_code: phone_verify_code.to_string(),
        }
    }

    async fn find_user(&self, user_id: &str) -> AppResult<users::Model> {
        users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("用户不存在".into()))
    }

    fn issue_tokens(&self, user: &users::Model) -> AppResult<TokenResponse> {
        let role = role_of(user);
        Ok(TokenResponse {
            token: self
                .jwt_service
                .generate_access_token(&user.user_id, role, user.admin_level)?,
            refresh_token: self
                .jwt_service
                .generate_refresh_token(&user.user_id, role, user.admin_level)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 小程序登录
    ///
    /// 按 open_id 查找或创建用户，刷新资料与 session_key，
    /// 确保推荐关系存在，首次登录时按推广码绑定推荐人
    pub async fn wx_login(&self, req: WxLoginRequest) -> AppResult<LoginResponse> {
        let session = self.wechat.code_to_session(req.code.trim()).await?;
        let now = Utc::now();

        let existing = users::Entity::find()
            .filter(users::Column::OpenId.eq(session.open_id.as_str()))
            .one(self.pool.as_ref())
            .await?;
        let is_new_user = existing.is_none();

        let mut active: users::ActiveModel = match existing {
            Some(user) => user.into(),
            None => users::ActiveModel {
                user_id: Set(generate_user_id()),
                open_id: Set(session.open_id.clone()),
                nick_name: Set("微信用户".to_string()),
                avatar_url: Set(String::new()),
                gender: Set(0),
                country: Set(String::new()),
                province: Set(String::new()),
                city: Set(String::new()),
                language: Set("zh_CN".to_string()),
                is_admin: Set(false),
                admin_level: Set(0),
                created_at: Set(now),
                ..Default::default()
            },
        };

        set_if_present(&mut active.nick_name, req.nick_name.as_ref());
        set_if_present(&mut active.avatar_url, req.avatar_url.as_ref());
        set_if_present(&mut active.country, req.country.as_ref());
        set_if_present(&mut active.province, req.province.as_ref());
        set_if_present(&mut active.city, req.city.as_ref());
        set_if_present(&mut active.language, req.language.as_ref());
        if let Some(gender) = req.gender {
            active.gender = Set(gender);
        }
        if session.union_id.is_some() {
            active.union_id = Set(session.union_id.clone());
        }
        active.session_key = Set(session.session_key.clone());
        active.last_login_at = Set(Some(now));
        active.updated_at = Set(now);

        let user = if is_new_user {
            active.insert(self.pool.as_ref()).await?
        } else {
            active.update(self.pool.as_ref()).await?
        };

        self.referral_service.ensure_referral(&user.user_id).await?;
        if is_new_user {
            self.referral_service
                .bind_on_login(&user.user_id, req.promoter_code.as_deref())
                .await;
        }

        let tokens = self.issue_tokens(&user)?;
        log::info!("User {} logged in, new user: {is_new_user}", user.user_id);

        Ok(LoginResponse {
            token: tokens.token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user_info: user.into(),
            is_new_user,
        })
    }

    /// 用刷新令牌换新令牌，角色按数据库当前状态重新签发
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = users::Entity::find()
            .filter(users::Column::UserId.eq(claims.sub.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("用户不存在".into()))?;
        self.issue_tokens(&user)
    }

    pub async fn get_info(&self, user_id: &str) -> AppResult<UserInfo> {
        Ok(self.find_user(user_id).await?.into())
    }

    pub async fn update_info(
        &self,
        user_id: &str,
        req: UpdateUserInfoRequest,
    ) -> AppResult<UserInfo> {
        let user = self.find_user(user_id).await?;
        let mut active: users::ActiveModel = user.into();
        set_if_present(&mut active.nick_name, req.nick_name.as_ref());
        set_if_present(&mut active.avatar_url, req.avatar_url.as_ref());
        set_if_present(&mut active.country, req.country.as_ref());
        set_if_present(&mut active.province, req.province.as_ref());
        set_if_present(&mut active.city, req.city.as_ref());
        set_if_present(&mut active.language, req.language.as_ref());
        if let Some(gender) = req.gender {
            if !(0..=2).contains(&gender) {
                return Err(AppError::ValidationError("性别取值不正确".into()));
            }
            active.gender = Set(gender);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(self.pool.as_ref()).await?.into())
    }

    /// 绑定手机号；验证码为配置中的固定值
    pub async fn bind_phone(&self, user_id: &str, req: BindPhoneRequest) -> AppResult<UserInfo> {
        let phone = req.phone.trim();
        validate_cn_phone(phone)?;
        if req.code.trim() != self.phone_verify_code {
            return Err(AppError::ValidationError("验证码错误".into()));
        }

        let user = self.find_user(user_id).await?;
        let mut active: users::ActiveModel = user.into();
        active.phone = Set(Some(phone.to_string()));
        active.updated_at = Set(Utc::now());
        let user = active.update(self.pool.as_ref()).await?;
        log::info!("User {user_id} bound phone {}", mask_phone(phone));
        Ok(user.into())
    }

    // ---- 地址 ----

    pub async fn list_addresses(&self, user_id: &str) -> AppResult<Vec<AddressResponse>> {
        let rows = addresses::Entity::find()
            .filter(addresses::Column::UserId.eq(user_id))
            .filter(addresses::Column::Status.eq(STATUS_ACTIVE))
            .order_by_desc(addresses::Column::IsDefault)
            .order_by_desc(addresses::Column::UpdatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn validate_address(req: &AddressRequest) -> AppResult<()> {
        if req.name.trim().is_empty() || req.address.trim().is_empty() {
            return Err(AppError::ValidationError("联系人和详细地址不能为空".into()));
        }
        validate_cn_phone(req.phone.trim())
    }

    /// 新增或更新地址；设为默认时在同一事务中清除其他默认地址
    pub async fn save_address(&self, user_id: &str, req: AddressRequest) -> AppResult<AddressResponse> {
        Self::validate_address(&req)?;
        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let mut active: addresses::ActiveModel = match req.id {
            Some(id) => addresses::Entity::find_by_id(id)
                .filter(addresses::Column::UserId.eq(user_id))
                .filter(addresses::Column::Status.eq(STATUS_ACTIVE))
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("地址不存在".into()))?
                .into(),
            None => addresses::ActiveModel {
                user_id: Set(user_id.to_string()),
                status: Set(STATUS_ACTIVE),
                created_at: Set(now),
                ..Default::default()
            },
        };

        if req.is_default {
            let mut clear = addresses::Entity::update_many()
                .col_expr(addresses::Column::IsDefault, Expr::value(false))
                .filter(addresses::Column::UserId.eq(user_id))
                .filter(addresses::Column::IsDefault.eq(true));
            if let Some(id) = req.id {
                clear = clear.filter(addresses::Column::Id.ne(id));
            }
            clear.exec(&txn).await?;
        }

        active.name = Set(req.name.trim().to_string());
        active.phone = Set(req.phone.trim().to_string());
        active.province = Set(req.province);
        active.city = Set(req.city);
        active.district = Set(req.district);
        active.address = Set(req.address.trim().to_string());
        active.is_default = Set(req.is_default);
        active.updated_at = Set(now);

        let saved = if req.id.is_some() {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };
        txn.commit().await?;
        Ok(saved.into())
    }

    pub async fn delete_address(&self, user_id: &str, id: i64) -> AppResult<()> {
        let result = addresses::Entity::update_many()
            .col_expr(addresses::Column::Status, Expr::value(STATUS_DELETED))
            .col_expr(addresses::Column::IsDefault, Expr::value(false))
            .col_expr(addresses::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(addresses::Column::Id.eq(id))
            .filter(addresses::Column::UserId.eq(user_id))
            .filter(addresses::Column::Status.eq(STATUS_ACTIVE))
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("地址不存在".into()));
        }
        Ok(())
    }

    // ---- 就诊人 ----

    pub async fn list_patients(&self, user_id: &str) -> AppResult<Vec<PatientResponse>> {
        let today = Local::now().date_naive();
        let rows = patients::Entity::find()
            .filter(patients::Column::UserId.eq(user_id))
            .filter(patients::Column::Status.eq(STATUS_ACTIVE))
            .order_by_desc(patients::Column::IsDefault)
            .order_by_desc(patients::Column::UpdatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|m| PatientResponse::from_model(m, today))
            .collect())
    }

    pub async fn save_patient(&self, user_id: &str, req: PatientRequest) -> AppResult<PatientResponse> {
        if req.name.trim().is_empty() {
            return Err(AppError::ValidationError("就诊人姓名不能为空".into()));
        }
        if let Some(phone) = req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            validate_cn_phone(phone)?;
        }
        if !(0..=2).contains(&req.gender) {
            return Err(AppError::ValidationError("性别取值不正确".into()));
        }

        let now = Utc::now();
        let txn = self.pool.begin().await?;

        let mut active: patients::ActiveModel = match req.id {
            Some(id) => patients::Entity::find_by_id(id)
                .filter(patients::Column::UserId.eq(user_id))
                .filter(patients::Column::Status.eq(STATUS_ACTIVE))
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::NotFound("就诊人不存在".into()))?
                .into(),
            None => patients::ActiveModel {
                user_id: Set(user_id.to_string()),
                status: Set(STATUS_ACTIVE),
                created_at: Set(now),
                ..Default::default()
            },
        };

        if req.is_default {
            let mut clear = patients::Entity::update_many()
                .col_expr(patients::Column::IsDefault, Expr::value(false))
                .filter(patients::Column::UserId.eq(user_id))
                .filter(patients::Column::IsDefault.eq(true));
            if let Some(id) = req.id {
                clear = clear.filter(patients::Column::Id.ne(id));
            }
            clear.exec(&txn).await?;
        }

        active.name = Set(req.name.trim().to_string());
        active.id_card = Set(req.id_card.filter(|s| !s.trim().is_empty()));
        active.phone = Set(req.phone.filter(|s| !s.trim().is_empty()));
        active.gender = Set(req.gender);
        active.birthday = Set(req.birthday);
        active.relation = Set(req.relation);
        active.is_default = Set(req.is_default);
        active.updated_at = Set(now);

        let saved = if req.id.is_some() {
            active.update(&txn).await?
        } else {
            active.insert(&txn).await?
        };
        txn.commit().await?;
        Ok(PatientResponse::from_model(saved, Local::now().date_naive()))
    }

    pub async fn delete_patient(&self, user_id: &str, id: i64) -> AppResult<()> {
        let result = patients::Entity::update_many()
            .col_expr(patients::Column::Status, Expr::value(STATUS_DELETED))
            .col_expr(patients::Column::IsDefault, Expr::value(false))
            .col_expr(patients::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(patients::Column::Id.eq(id))
            .filter(patients::Column::UserId.eq(user_id))
            .filter(patients::Column::Status.eq(STATUS_ACTIVE))
            .exec(self.pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("就诊人不存在".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connection::testing::{IntoPool, transaction_log};
    use crate::config::WechatConfig;
    use crate::services::CommissionService;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn service(db: DbPool) -> UserService {
        let referral = ReferralService::new(
            db.clone(),
            CommissionService::new(db.clone()),
            "https://cdn.example.com/qr",
        );
        UserService::new(
            db,
            JwtService::new("test-secret", 3600, 7200),
            WechatClient::new(WechatConfig::default()),
            referral,
            "123456",
        )
    }

    fn address(id: i64, is_default: bool) -> addresses::Model {
        let now = Utc::now();
        addresses::Model {
            id,
            user_id: "u1".into(),
            name: "张三".into(),
            phone: "13800000000".into(),
            province: "广东省".into(),
            city: "深圳市".into(),
            district: "南山区".into(),
            address: "科技园1号".into(),
            is_default,
            status: STATUS_ACTIVE,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_bind_phone_rejects_wrong_code_or_format() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let svc = service(db);
        let bad_code = svc
            .bind_phone(
                "u1",
                BindPhoneRequest {
                    phone: "13800000000".into(),
                    code: "000000".into(),
                },
            )
            .await;
        assert!(matches!(bad_code, Err(AppError::ValidationError(_))));

        let bad_phone = svc
            .bind_phone(
                "u1",
                BindPhoneRequest {
                    phone: "23800000000".into(),
                    code: "123456".into(),
                },
            )
            .await;
        assert!(matches!(bad_phone, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_default_address_clears_others_in_transaction() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 7,
                    rows_affected: 1,
                },
            ])
            .append_query_results([vec![address(7, true)]])
            .into_pool();

        let resp = service(db.clone())
            .save_address(
                "u1",
                AddressRequest {
                    id: None,
                    name: "张三".into(),
                    phone: "13800000000".into(),
                    province: "广东省".into(),
                    city: "深圳市".into(),
                    district: "南山区".into(),
                    address: "科技园1号".into(),
                    is_default: true,
                },
            )
            .await
            .unwrap();
        assert!(resp.is_default);
        assert_eq!(resp.full_address, "广东省深圳市南山区科技园1号");

        let log = transaction_log(db);
        assert!(log.contains("UPDATE `user_addresses` SET `is_default`"));
        assert!(log.contains("INSERT INTO `user_addresses`"));
    }

    #[tokio::test]
    async fn test_delete_missing_address() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_pool();
        let err = service(db).delete_address("u1", 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let db = MockDatabase::new(DatabaseBackend::MySql).into_pool();
        let svc = service(db);
        let access = JwtService::new("test-secret", 3600, 7200)
            .generate_access_token("u1", ROLE_USER, 0)
            .unwrap();
        assert!(matches!(
            svc.refresh_token(&access).await,
            Err(AppError::AuthError(_))
        ));
    }
}
