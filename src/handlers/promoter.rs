use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::{CommissionService, ReferralService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/promoter/info",
    tag = "promoter",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "推广员信息", body = PromoterInfoResponse))
)]
pub async fn promoter_info(
    referral_service: web::Data<ReferralService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match referral_service.promoter_info(&user.user_id).await {
        Ok(info) => Ok(HttpResponse::Ok().json(ApiResponse::success(info))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/promoter/commission_list",
    tag = "promoter",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量，默认20"),
        ("status" = Option<i32>, Query, description = "0 待结算 / 1 已结算 / 2 已提现")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "佣金明细"))
)]
pub async fn commission_list(
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    query: web::Query<LedgerListQuery>,
) -> Result<HttpResponse> {
    match commission_service
        .list_commissions(&user.user_id, &query)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/promoter/cashout_list",
    tag = "promoter",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量，默认20"),
        ("status" = Option<i32>, Query, description = "提现状态")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "提现记录"))
)]
pub async fn cashout_list(
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    query: web::Query<LedgerListQuery>,
) -> Result<HttpResponse> {
    match commission_service.list_cashouts(&user.user_id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/promoter/by_code",
    tag = "promoter",
    params(("code" = String, Query, description = "6位推广码")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "推广员公开信息", body = PromoterPublicInfo),
        (status = 400, description = "推广码格式错误")
    )
)]
pub async fn by_code(
    referral_service: web::Data<ReferralService>,
    query: web::Query<PromoterCodeQuery>,
) -> Result<HttpResponse> {
    match referral_service.by_code(&query.code).await {
        Ok(info) => Ok(HttpResponse::Ok().json(ApiResponse::success(info))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/promoter/bind",
    tag = "promoter",
    request_body = BindReferrerRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "绑定成功", body = BindReferrerResponse))
)]
pub async fn bind(
    referral_service: web::Data<ReferralService>,
    user: CurrentUser,
    request: web::Json<BindReferrerRequest>,
) -> Result<HttpResponse> {
    match referral_service
        .bind(&user.user_id, &request.promoter_code)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/referral/qrcode",
    tag = "referral",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "推广二维码", body = QrcodeResponse))
)]
pub async fn qrcode(
    referral_service: web::Data<ReferralService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match referral_service.qrcode(&user.user_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/referral/report",
    tag = "referral",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "推广报告", body = ReferralReportResponse))
)]
pub async fn report(
    referral_service: web::Data<ReferralService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match referral_service.report(&user.user_id).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/referral/config",
    tag = "referral",
    responses((status = 200, description = "佣金规则", body = ReferralConfigResponse))
)]
pub async fn referral_config_info(
    referral_service: web::Data<ReferralService>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(referral_service.config())))
}

#[utoipa::path(
    post,
    path = "/api/referral/apply_cashout",
    tag = "referral",
    request_body = ApplyCashoutRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "提现申请已提交", body = ApplyCashoutResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn apply_cashout(
    commission_service: web::Data<CommissionService>,
    user: CurrentUser,
    request: web::Json<ApplyCashoutRequest>,
) -> Result<HttpResponse> {
    match commission_service
        .apply_cashout(&user.user_id, &request)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promoter_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promoter")
            .route("/info", web::get().to(promoter_info))
            .route("/commission_list", web::get().to(commission_list))
            .route("/cashout_list", web::get().to(cashout_list))
            .route("/by_code", web::get().to(by_code))
            .route("/bind", web::post().to(bind)),
    )
    .service(
        web::scope("/referral")
            .route("/qrcode", web::get().to(qrcode))
            .route("/report", web::get().to(report))
            .route("/config", web::get().to(referral_config_info))
            .route("/apply_cashout", web::post().to(apply_cashout)),
    );
}
