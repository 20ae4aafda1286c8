use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 统一响应包装：{code: 0|-1, errorMsg?, data}
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(rename = "errorMsg", skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            error_msg: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: -1,
            error_msg: Some(message.into()),
            data: None,
        }
    }
}

/// 只带提示信息的响应
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// ?id= 形式的查询
#[derive(Debug, Deserialize, ToSchema)]
pub struct IdQuery {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success(json!({"orderId": 1}))).unwrap();
        assert_eq!(value, json!({"code": 0, "data": {"orderId": 1}}));
    }

    #[test]
    fn test_error_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::error("订单不存在")).unwrap();
        assert_eq!(
            value,
            json!({"code": -1, "errorMsg": "订单不存在", "data": null})
        );
    }
}
