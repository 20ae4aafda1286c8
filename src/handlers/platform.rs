use crate::models::*;
use crate::services::ConfigService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/api/config",
    tag = "platform",
    responses((status = 200, description = "平台配置", body = PlatformConfig))
)]
pub async fn platform_config(config_service: web::Data<ConfigService>) -> Result<HttpResponse> {
    match config_service.platform_config().await {
        Ok(cfg) => Ok(HttpResponse::Ok().json(ApiResponse::success(cfg))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn platform_config_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/config", web::get().to(platform_config));
}
