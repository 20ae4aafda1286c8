use crate::middlewares::CurrentUser;
use crate::models::ApiResponse;
use crate::services::{AdminService, SseBroadcaster, SseEventType, SseMessage, Subscriber};
use crate::utils::ROLE_ADMIN;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpResponse, ResponseError, Result, web};
use futures_util::stream;
use serde_json::json;
use std::time::Duration;
use tokio::time::{Instant, interval_at};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// 建立 SSE 长连接：先推欢迎消息，之后转发广播并每 30 秒发送心跳
///
/// 普通用户只收到自己的订单变更，管理员（以数据库为准）收到全部推送。
#[utoipa::path(
    get,
    path = "/api/sse",
    tag = "sse",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "text/event-stream"))
)]
pub async fn connect(
    admin_service: web::Data<AdminService>,
    broadcaster: web::Data<SseBroadcaster>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    let is_admin =
        user.role == ROLE_ADMIN && admin_service.require_admin(&user.user_id).await.is_ok();
    let subscriber = Subscriber {
        user_id: user.user_id.clone(),
        is_admin,
    };
    let subscription = match broadcaster.subscribe(subscriber).await {
        Ok(sub) => sub,
        Err(e) => return Ok(e.error_response()),
    };

    let welcome = SseMessage::new(
        SseEventType::System,
        json!({ "message": "连接成功", "clientId": subscription.id }),
    )
    .to_frame();
    let ticker = interval_at(Instant::now() + HEARTBEAT_INTERVAL, HEARTBEAT_INTERVAL);

    // 连接断开时 stream 被 drop，subscription 随之注销
    let body = stream::unfold(
        (subscription, ticker, Some(welcome)),
        |(mut sub, mut ticker, mut pending)| async move {
            let frame = match pending.take() {
                Some(frame) => frame,
                None => tokio::select! {
                    frame = sub.receiver.recv() => frame?,
                    _ = ticker.tick() => SseMessage::heartbeat().to_frame(),
                },
            };
            Some((
                Ok::<_, actix_web::Error>(web::Bytes::from(frame)),
                (sub, ticker, pending),
            ))
        },
    );

    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(body))
}

#[utoipa::path(
    get,
    path = "/api/sse/clients",
    tag = "sse",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "当前连接数"),
        (status = 403, description = "权限不足")
    )
)]
pub async fn clients(
    admin_service: web::Data<AdminService>,
    broadcaster: web::Data<SseBroadcaster>,
    user: CurrentUser,
) -> Result<HttpResponse> {
    if let Err(e) = admin_service.require_admin(&user.user_id).await {
        return Ok(e.error_response());
    }
    match broadcaster.client_count().await {
        Ok(count) => Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "count": count })))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn sse_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/sse", web::get().to(connect))
        .route("/sse/clients", web::get().to(clients));
}
