pub mod admin;
pub mod catalog;
pub mod file;
pub mod order;
pub mod platform;
pub mod promoter;
pub mod sse;
pub mod support;
pub mod user;

pub use admin::admin_config;
pub use catalog::catalog_config;
pub use file::file_config;
pub use order::order_config;
pub use platform::platform_config_routes;
pub use promoter::promoter_config;
pub use sse::sse_config;
pub use support::support_config;
pub use user::user_config;

use crate::error::AppError;
use actix_web::web;

/// 请求体/查询参数解析失败统一返回 400 + 标准包装
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Malformed JSON body: {err}");
        AppError::ValidationError(format!("请求参数错误: {err}")).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        log::debug!("Malformed query string: {err}");
        AppError::ValidationError(format!("请求参数错误: {err}")).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("路径参数错误: {err}")).into()
    })
}

/// 挂载全部 /api 路由
pub fn api_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(user_config)
            .configure(order_config)
            .configure(promoter_config)
            .configure(admin_config)
            .configure(catalog_config)
            .configure(support_config)
            .configure(file_config)
            .configure(platform_config_routes)
            .configure(sse_config),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiResponse, TimeSlotsRequest};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};

    async fn echo(body: web::Json<TimeSlotsRequest>) -> HttpResponse {
        HttpResponse::Ok().json(ApiResponse::success(body.into_inner().date))
    }

    #[actix_web::test]
    async fn test_malformed_body_returns_400_envelope() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .route("/echo", web::post().to(echo)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], -1);
        assert!(body["errorMsg"].as_str().unwrap().starts_with("请求参数错误"));
    }

    #[actix_web::test]
    async fn test_success_envelope() {
        let app = test::init_service(
            App::new()
                .app_data(json_config())
                .route("/echo", web::post().to(echo)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/echo")
            .set_json(serde_json::json!({ "date": "2025-06-11" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"], "2025-06-11");
    }
}
