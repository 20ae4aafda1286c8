use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::UserService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/wx/login",
    tag = "user",
    request_body = WxLoginRequest,
    responses(
        (status = 200, description = "登录成功", body = LoginResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn wx_login(
    user_service: web::Data<UserService>,
    request: web::Json<WxLoginRequest>,
) -> Result<HttpResponse> {
    match user_service.wx_login(request.into_inner()).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "user",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "刷新成功", body = TokenResponse),
        (status = 401, description = "刷新令牌无效")
    )
)]
pub async fn refresh(
    user_service: web::Data<UserService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match user_service.refresh_token(&request.refresh_token).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/user/info",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "获取用户信息成功", body = UserInfo),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_info(
    user_service: web::Data<UserService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match user_service.get_info(&user.user_id).await {
        Ok(info) => Ok(HttpResponse::Ok().json(ApiResponse::success(info))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/api/user/info",
    tag = "user",
    request_body = UpdateUserInfoRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "更新成功", body = UserInfo),
        (status = 401, description = "未授权")
    )
)]
pub async fn update_info(
    user_service: web::Data<UserService>,
    user: CurrentUser,
    request: web::Json<UpdateUserInfoRequest>,
) -> Result<HttpResponse> {
    match user_service
        .update_info(&user.user_id, request.into_inner())
        .await
    {
        Ok(info) => Ok(HttpResponse::Ok().json(ApiResponse::success(info))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/user/bind_phone",
    tag = "user",
    request_body = BindPhoneRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "绑定成功", body = UserInfo),
        (status = 400, description = "手机号或验证码错误")
    )
)]
pub async fn bind_phone(
    user_service: web::Data<UserService>,
    user: CurrentUser,
    request: web::Json<BindPhoneRequest>,
) -> Result<HttpResponse> {
    match user_service
        .bind_phone(&user.user_id, request.into_inner())
        .await
    {
        Ok(info) => Ok(HttpResponse::Ok().json(ApiResponse::success(info))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/user/address",
    tag = "user",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "地址列表", body = [AddressResponse]))
)]
pub async fn list_addresses(
    user_service: web::Data<UserService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match user_service.list_addresses(&user.user_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

/// POST 新增、PUT 更新（请求体带 id）
#[utoipa::path(
    post,
    path = "/api/user/address",
    tag = "user",
    request_body = AddressRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "保存成功", body = AddressResponse))
)]
pub async fn save_address(
    user_service: web::Data<UserService>,
    user: CurrentUser,
    request: web::Json<AddressRequest>,
) -> Result<HttpResponse> {
    match user_service
        .save_address(&user.user_id, request.into_inner())
        .await
    {
        Ok(address) => Ok(HttpResponse::Ok().json(ApiResponse::success(address))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/user/address",
    tag = "user",
    params(("id" = i64, Query, description = "地址ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "删除成功", body = MessageResponse))
)]
pub async fn delete_address(
    user_service: web::Data<UserService>,
    user: CurrentUser,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse> {
    match user_service.delete_address(&user.user_id, query.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(MessageResponse::new("删除成功")))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/user/patient",
    tag = "user",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "就诊人列表", body = [PatientResponse]))
)]
pub async fn list_patients(
    user_service: web::Data<UserService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    match user_service.list_patients(&user.user_id).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/user/patient",
    tag = "user",
    request_body = PatientRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "保存成功", body = PatientResponse))
)]
pub async fn save_patient(
    user_service: web::Data<UserService>,
    user: CurrentUser,
    request: web::Json<PatientRequest>,
) -> Result<HttpResponse> {
    match user_service
        .save_patient(&user.user_id, request.into_inner())
        .await
    {
        Ok(patient) => Ok(HttpResponse::Ok().json(ApiResponse::success(patient))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/api/user/patient",
    tag = "user",
    params(("id" = i64, Query, description = "就诊人ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "删除成功", body = MessageResponse))
)]
pub async fn delete_patient(
    user_service: web::Data<UserService>,
    user: CurrentUser,
    query: web::Query<IdQuery>,
) -> Result<HttpResponse> {
    match user_service.delete_patient(&user.user_id, query.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success(MessageResponse::new("删除成功")))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/wx/login", web::post().to(wx_login))
        .route("/auth/refresh", web::post().to(refresh))
        .service(
            web::scope("/user")
                .route("/info", web::get().to(get_info))
                .route("/info", web::put().to(update_info))
                .route("/bind_phone", web::post().to(bind_phone))
                .route("/address", web::get().to(list_addresses))
                .route("/address", web::post().to(save_address))
                .route("/address", web::put().to(save_address))
                .route("/address", web::delete().to(delete_address))
                .route("/patient", web::get().to(list_patients))
                .route("/patient", web::post().to(save_patient))
                .route("/patient", web::put().to(save_patient))
                .route("/patient", web::delete().to(delete_patient)),
        );
}
