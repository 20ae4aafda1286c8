use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::{AdminService, ConsultationService, KefuService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/kefu/send_msg",
    tag = "support",
    request_body = SendKefuMessageRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "发送成功", body = SendKefuMessageResponse))
)]
pub async fn send_kefu_message(
    kefu_service: web::Data<KefuService>,
    user: CurrentUser,
    request: web::Json<SendKefuMessageRequest>,
) -> Result<HttpResponse> {
    match kefu_service
        .send_message(&user.user_id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/kefu/faq",
    tag = "support",
    params(
        ("category" = Option<String>, Query, description = "分类"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量，默认20")
    ),
    responses((status = 200, description = "常见问题列表"))
)]
pub async fn faq_list(
    kefu_service: web::Data<KefuService>,
    query: web::Query<FaqQuery>,
) -> Result<HttpResponse> {
    match kefu_service.list_faqs(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/kefu/faq/{id}",
    tag = "support",
    params(("id" = i64, Path, description = "问题ID")),
    responses((status = 200, description = "问题详情", body = FaqItem))
)]
pub async fn faq_detail(
    kefu_service: web::Data<KefuService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match kefu_service.faq_detail(path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(ApiResponse::success(item))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/consultation/create",
    tag = "support",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "当前会话", body = ConsultationResponse))
)]
pub async fn create_consultation(
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match consultation_service.create(&user.user_id).await {
        Ok(consultation) => Ok(HttpResponse::Ok().json(ApiResponse::success(consultation))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/consultation/{id}/message",
    tag = "support",
    params(("id" = i64, Path, description = "咨询ID")),
    request_body = ConsultationMessageRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "发送成功", body = ConsultationMessageItem))
)]
pub async fn send_consultation_message(
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: web::Json<ConsultationMessageRequest>,
) -> Result<HttpResponse> {
    match consultation_service
        .send_user_message(&user.user_id, path.into_inner(), &request.content)
        .await
    {
        Ok(message) => Ok(HttpResponse::Ok().json(ApiResponse::success(message))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/consultation/{id}/messages",
    tag = "support",
    params(("id" = i64, Path, description = "咨询ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "消息列表", body = [ConsultationMessageItem]))
)]
pub async fn consultation_messages(
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match consultation_service
        .user_messages(&user.user_id, path.into_inner())
        .await
    {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/consultation/{id}/close",
    tag = "support",
    params(("id" = i64, Path, description = "咨询ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "已结束", body = ConsultationResponse))
)]
pub async fn close_consultation(
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match consultation_service
        .close(&user.user_id, path.into_inner())
        .await
    {
        Ok(consultation) => Ok(HttpResponse::Ok().json(ApiResponse::success(consultation))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 管理员通知（未读在前）
#[utoipa::path(
    get,
    path = "/api/consultation/notifications",
    tag = "support",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "通知列表", body = [ConsultationNotificationItem]),
        (status = 403, description = "权限不足")
    )
)]
pub async fn notifications(
    admin_service: web::Data<AdminService>,
    consultation_service: web::Data<ConsultationService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let scope = match admin_service.require_admin(&user.user_id).await {
        Ok((_, scope)) => scope,
        Err(e) => return Ok(e.error_response()),
    };
    match consultation_service.notifications(&scope).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn support_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/kefu")
            .route("/send_msg", web::post().to(send_kefu_message))
            .route("/faq", web::get().to(faq_list))
            .route("/faq/{id}", web::get().to(faq_detail)),
    )
    .service(
        web::scope("/consultation")
            .route("/create", web::post().to(create_consultation))
            .route("/notifications", web::get().to(notifications))
            .route("/{id}/message", web::post().to(send_consultation_message))
            .route("/{id}/messages", web::get().to(consultation_messages))
            .route("/{id}/close", web::post().to(close_consultation)),
    );
}
