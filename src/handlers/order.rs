use crate::middlewares::CurrentUser;
use crate::models::*;
use crate::services::{AdminService, OrderService, OrderTimeoutService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/api/order/submit",
    tag = "order",
    request_body = SubmitOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "下单成功", body = SubmitOrderResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权")
    )
)]
pub async fn submit(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    request: web::Json<SubmitOrderRequest>,
) -> Result<HttpResponse> {
    match order_service
        .submit(&user.user_id, request.into_inner())
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/order/pay/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = PayOrderRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "支付参数", body = PayParams))
)]
pub async fn pay(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: Option<web::Json<PayOrderRequest>>,
) -> Result<HttpResponse> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match order_service
        .pay(&user.user_id, path.into_inner(), request)
        .await
    {
        Ok(params) => Ok(HttpResponse::Ok().json(ApiResponse::success(params))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/order/pay_confirm/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = PayConfirmRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "支付成功", body = OrderResponse))
)]
pub async fn pay_confirm(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: Option<web::Json<PayConfirmRequest>>,
) -> Result<HttpResponse> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match order_service
        .pay_confirm(&user.user_id, path.into_inner(), request)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/order/cancel/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = CancelOrderRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "取消成功", body = OrderResponse))
)]
pub async fn cancel(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: Option<web::Json<CancelOrderRequest>>,
) -> Result<HttpResponse> {
    let request = request.map(web::Json::into_inner).unwrap_or_default();
    match order_service
        .cancel(&user.user_id, path.into_inner(), request)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/order/refund/{id}",
    tag = "order",
    params(("id" = i64, Path, description = "订单ID")),
    request_body = RefundOrderRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "退款申请已提交", body = OrderResponse))
)]
pub async fn refund(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    path: web::Path<i64>,
    request: web::Json<RefundOrderRequest>,
) -> Result<HttpResponse> {
    match order_service
        .refund(&user.user_id, path.into_inner(), request.into_inner())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/order/list",
    tag = "order",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("pageSize" = Option<u64>, Query, description = "每页数量，默认10，最大50"),
        ("status" = Option<i32>, Query, description = "订单状态")
    ),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "订单列表"))
)]
pub async fn list(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse> {
    match order_service.list(&user.user_id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/order/detail",
    tag = "order",
    params(("orderId" = i64, Query, description = "订单ID")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "订单详情", body = OrderResponse))
)]
pub async fn detail(
    order_service: web::Data<OrderService>,
    user: CurrentUser,
    query: web::Query<OrderDetailQuery>,
) -> Result<HttpResponse> {
    match order_service.detail(&user.user_id, query.order_id).await {
        Ok(order) => Ok(HttpResponse::Ok().json(ApiResponse::success(order))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/order/time_slots",
    tag = "order",
    request_body = TimeSlotsRequest,
    security(("bearer_auth" = [])),
    responses((status = 200, description = "可预约时段", body = TimeSlotsResponse))
)]
pub async fn time_slots(
    order_service: web::Data<OrderService>,
    request: web::Json<TimeSlotsRequest>,
) -> Result<HttpResponse> {
    match order_service.time_slots(&request.date) {
        Ok(slots) => Ok(HttpResponse::Ok().json(ApiResponse::success(slots))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 手动触发一次超时订单检查（管理员）
#[utoipa::path(
    post,
    path = "/api/order/check_expired",
    tag = "order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "检查完成", body = ExpiredCheckResponse),
        (status = 403, description = "权限不足")
    )
)]
pub async fn check_expired(
    admin_service: web::Data<AdminService>,
    timeout_service: web::Data<OrderTimeoutService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    if let Err(e) = admin_service.require_admin(&user.user_id).await {
        return Ok(e.error_response());
    }
    match timeout_service.run_once().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(ExpiredCheckResponse {
            message: format!("已取消 {count} 个超时订单"),
            expired_count: count,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/api/order/expired_count",
    tag = "order",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "超时未支付订单数", body = ExpiredCountResponse),
        (status = 403, description = "权限不足")
    )
)]
pub async fn expired_count(
    admin_service: web::Data<AdminService>,
    timeout_service: web::Data<OrderTimeoutService>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    if let Err(e) = admin_service.require_admin(&user.user_id).await {
        return Ok(e.error_response());
    }
    match timeout_service.count_expired().await {
        Ok(expired_count) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ExpiredCountResponse { expired_count },
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/order")
            .route("/submit", web::post().to(submit))
            .route("/pay/{id}", web::post().to(pay))
            .route("/pay_confirm/{id}", web::post().to(pay_confirm))
            .route("/cancel/{id}", web::post().to(cancel))
            .route("/refund/{id}", web::post().to(refund))
            .route("/list", web::get().to(list))
            .route("/detail", web::get().to(detail))
            .route("/time_slots", web::post().to(time_slots))
            .route("/check_expired", web::post().to(check_expired))
            .route("/expired_count", web::get().to(expired_count)),
    );
}
