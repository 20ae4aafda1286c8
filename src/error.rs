use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 业务规则不满足（订单状态不对、余额不足等），HTTP 200 + code=-1
    #[error("Business error: {0}")]
    BusinessError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// 返回给客户端的状态码与错误信息（数据库/内部错误不透出原始信息）
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::BusinessError(msg) => (StatusCode::OK, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::OK, msg.clone()),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::JwtError(_) => (StatusCode::UNAUTHORIZED, "登录已失效".to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "禁止访问".to_string()),
            AppError::PermissionDenied => (StatusCode::FORBIDDEN, "权限不足".to_string()),
            AppError::ExternalApiError(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::ReqwestError(_) => (StatusCode::BAD_GATEWAY, "外部服务请求失败".to_string()),
            AppError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "数据库错误".to_string())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "服务器内部错误".to_string(),
            ),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_and_message().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, message) = self.status_and_message();

        match self {
            AppError::ValidationError(_) | AppError::BusinessError(_) | AppError::NotFound(_) => {
                log::warn!("Request rejected: {self}");
            }
            AppError::AuthError(_)
            | AppError::JwtError(_)
            | AppError::Forbidden
            | AppError::PermissionDenied => {
                log::warn!("Authentication error: {self}");
            }
            _ => log::error!("{self}"),
        }

        HttpResponse::build(status_code).json(json!({
            "code": -1,
            "errorMsg": message,
            "data": null
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.error_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_business_error_is_200_with_code_minus_one() {
        let (status, body) = body_json(AppError::BusinessError("订单状态不允许支付".into())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], -1);
        assert_eq!(body["errorMsg"], "订单状态不允许支付");
        assert!(body["data"].is_null());
    }

    #[actix_web::test]
    async fn test_database_error_is_sanitized() {
        let err = AppError::DatabaseError(sea_orm::DbErr::Custom(
            "Table 'wxapp.orders' doesn't exist".into(),
        ));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errorMsg"], "数据库错误");
        assert!(!body.to_string().contains("doesn't exist"));
    }

    #[actix_web::test]
    async fn test_auth_error_is_401() {
        let (status, body) = body_json(AppError::AuthError("Missing access token".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], -1);
    }
}
