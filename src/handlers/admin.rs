use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::{
    AdminService, CommissionService, ConsultationService, OrderService, ReferralService,
};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

/// 校验管理员身份并取出可见范围，失败时直接返回错误响应
macro_rules! require_admin {
    ($svc:expr, $user:expr) => {
        match $svc.require_admin(&$user.user_id).await {
            Ok(v) => v,
            Err(e) => return Ok(e.error_response()),
        }
    };
}

#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "admin",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AdminLoginResponse),
        (status = 401, description = "用户名或密码错误")
    )
)]
pub async fn login(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse> {
    let login_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(str::to_string);
    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match admin_service
        .login(request.into_inner(), login_ip, user_agent)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/check",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "管理员状态", body = AdminCheckResponse))
)]
pub async fn check(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match admin_service.check(&user.user_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "用户列表"),
        (status = 403, description = "权限不足")
    )
)]
pub async fn users(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
    query: web::Query<AdminPageQuery>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match admin_service.users(&scope, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = "admin",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<i32>, Query, description = "订单状态")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "订单列表"),
        (status = 403, description = "权限不足")
    )
)]
pub async fn orders(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
    query: web::Query<AdminPageQuery>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match admin_service.orders(&scope, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "统计数据", body = AdminStats))
)]
pub async fn stats(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match admin_service.stats(&scope).await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/set_admin",
    tag = "admin",
    request_body = SetAdminRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "设置成功", body = AdminItem),
        (status = 403, description = "仅超级管理员可操作")
    )
)]
pub async fn set_admin(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
    request: web::Json<SetAdminRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .set_admin(&user.user_id, request.into_inner())
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/remove_admin",
    tag = "admin",
    request_body = RemoveAdminRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "已移除", body = MessageResponse),
        (status = 403, description = "仅超级管理员可操作")
    )
)]
pub async fn remove_admin(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
    request: web::Json<RemoveAdminRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .remove_admin(&user.user_id, request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(MessageResponse::new(
            "已移除管理员权限",
        )))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/admins",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "管理员列表", body = [AdminItem]))
)]
pub async fn admins(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let (admin, _) = require_admin!(admin_service, user);
    match admin_service.admins(&admin).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/login_logs",
    tag = "admin",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "登录日志"))
)]
pub async fn login_logs(
    admin_service: web::Data<AdminService>,
    user: CurrentUser,
    query: web::Query<AdminPageQuery>,
) -> Result<HttpResponse> {
    let (admin, _) = require_admin!(admin_service, user);
    match admin_service.login_logs(&admin.user_id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/order/complete/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "订单已完成", body = OrderResponse))
)]
pub async fn complete_order(
    admin_service: web::Data<AdminService>,
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match order_service
        .admin_complete(&scope, path.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/order/refund_confirm/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "订单ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "退款完成", body = OrderResponse))
)]
pub async fn confirm_refund(
    admin_service: web::Data<AdminService>,
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match order_service
        .admin_confirm_refund(&scope, path.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 佣金结算（超级管理员）
#[utoipa::path(
    post,
    path = "/api/admin/commission/settle",
    tag = "admin",
    request_body = SettleCommissionRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "结算条数", body = SettleCommissionResponse),
        (status = 403, description = "仅超级管理员可操作")
    )
)]
pub async fn settle_commissions(
    admin_service: web::Data<AdminService>,
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    request: web::Json<SettleCommissionRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = admin_service.require_super_admin(&user.user_id).await {
        return Ok(e.error_response());
    }
    match commission_service.settle(&request).await {
        Ok(settled) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SettleCommissionResponse { settled },
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/cashouts",
    tag = "admin",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量"),
        ("status" = Option<i32>, Query, description = "提现状态")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "提现申请列表"))
)]
pub async fn cashouts(
    admin_service: web::Data<AdminService>,
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    query: web::Query<LedgerListQuery>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match commission_service.admin_list_cashouts(&scope, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/cashout/approve/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "提现ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "审核通过", body = CashoutItem))
)]
pub async fn approve_cashout(
    admin_service: web::Data<AdminService>,
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match commission_service
        .approve_cashout(&scope, path.into_inner())
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/cashout/reject/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "提现ID")),
    request_body = CashoutReviewRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "已拒绝", body = CashoutItem))
)]
pub async fn reject_cashout(
    admin_service: web::Data<AdminService>,
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: Option<web::Json<CashoutReviewRequest>>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    let remark = request.and_then(|r| r.into_inner().remark);
    match commission_service
        .reject_cashout(&scope, path.into_inner(), remark)
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/cashout/pay/{id}",
    tag = "admin",
    params(("id" = i64, Path, description = "提现ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "已打款", body = CashoutItem))
)]
pub async fn pay_cashout(
    admin_service: web::Data<AdminService>,
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match commission_service
        .pay_cashout(&scope, path.into_inner())
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/consultations",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "咨询列表", body = [ConsultationResponse]))
)]
pub async fn consultations(
    admin_service: web::Data<AdminService>,
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match consultation_service.admin_list(&scope).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/consultation/{id}/reply",
    tag = "admin",
    params(("id" = i64, Path, description = "咨询ID")),
    request_body = ConsultationReplyRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "回复成功", body = ConsultationMessageItem))
)]
pub async fn reply_consultation(
    admin_service: web::Data<AdminService>,
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: web::Json<ConsultationReplyRequest>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match consultation_service
        .admin_reply(&scope, path.into_inner(), &request.content)
        .await
    {
        Ok(message) => Ok(HttpResponse::Ok().json(ApiResponse::success(message))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/consultation/{id}/messages",
    tag = "admin",
    params(("id" = i64, Path, description = "咨询ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "消息列表", body = [ConsultationMessageItem]))
)]
pub async fn consultation_messages(
    admin_service: web::Data<AdminService>,
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let (_, scope) = require_admin!(admin_service, user);
    match consultation_service
        .admin_messages(&scope, path.into_inner())
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/admin/promoter/generate_codes",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "补全推广码", body = GenerateCodesResponse),
        (status = 403, description = "仅超级管理员可操作")
    )
)]
pub async fn generate_codes(
    admin_service: web::Data<AdminService>,
    referral_service: web::Data<ReferralService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    if let Err(e) = admin_service.require_super_admin(&user.user_id).await {
        return Ok(e.error_response());
    }
    match referral_service.generate_missing_codes().await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/login", web::post().to(login))
            .route("/check", web::get().to(check))
            .route("/users", web::get().to(users))
            .route("/orders", web::get().to(orders))
            .route("/stats", web::get().to(stats))
            .route("/set_admin", web::post().to(set_admin))
            .route("/remove_admin", web::post().to(remove_admin))
            .route("/admins", web::get().to(admins))
            .route("/login_logs", web::get().to(login_logs))
            .route("/order/complete/{id}", web::post().to(complete_order))
            .route("/order/refund_confirm/{id}", web::post().to(confirm_refund))
            .route("/commission/settle", web::post().to(settle_commissions))
            .route("/cashouts", web::get().to(cashouts))
            .route("/cashout/approve/{id}", web::post().to(approve_cashout))
            .route("/cashout/reject/{id}", web::post().to(reject_cashout))
            .route("/cashout/pay/{id}", web::post().to(pay_cashout))
            .route("/consultations", web::get().to(consultations))
            .route("/consultation/{id}/reply", web::post().to(reply_consultation))
            .route(
                "/consultation/{id}/messages",
                web::get().to(consultation_messages),
            )
            .route("/promoter/generate_codes", web::post().to(generate_codes)),
    );
}
