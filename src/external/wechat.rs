use crate::config::WechatConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const JSCODE2SESSION_ENDPOINT: &str = "https://api.weixin.qq.com/sns/jscode2session";

/// code 换取的会话信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WxSession {
    pub open_id: String,
    pub union_id: Option<String>,
    pub session_key: Option<String>,
}

#[derive(Clone)]
pub struct WechatClient {
    http: Client,
    cfg: WechatConfig,
}

impl WechatClient {
    pub fn new(cfg: WechatConfig) -> Self {
        let http = Client::builder()
            .user_agent("wxapp-backend/wechat")
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Failed to build wechat http client, using defaults: {e}");
                Client::new()
            });
        Self { http, cfg }
    }

    /// 未配置 app_id 时走离线模式
    pub fn is_enabled(&self) -> bool {
        !self.cfg.app_id.is_empty()
    }

    pub async fn code_to_session(&self, code: &str) -> AppResult<WxSession> {
        if code.is_empty() {
            return Err(AppError::ValidationError("缺少登录code".into()));
        }

        if !self.is_enabled() {
            return Ok(offline_session(code));
        }

        let resp = self
            .http
            .get(JSCODE2SESSION_ENDPOINT)
            .query(&[
                ("appid", self.cfg.app_id.as_str()),
                ("secret", self.cfg.app_secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body: Code2SessionResponse = resp.json().await?;

        if !status.is_success() || body.errcode.unwrap_or(0) != 0 {
            return Err(AppError::ExternalApiError(format!(
                "微信登录失败: HTTP {}: {} {}",
                status.as_u16(),
                body.errcode.unwrap_or(0),
                body.errmsg.unwrap_or_default()
            )));
        }

        let open_id = body
            .openid
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ExternalApiError("微信登录未返回openid".into()))?;

        Ok(WxSession {
            open_id,
            union_id: body.unionid,
            session_key: body.session_key,
        })
    }
}

/// 离线模式：openId = mock_ + md5(code)，同一 code 总是得到同一用户
fn offline_session(code: &str) -> WxSession {
    WxSession {
        open_id: format!("mock_{:x}", md5::compute(code.as_bytes())),
        union_id: None,
        session_key: None,
    }
}

#[derive(Debug, Deserialize)]
struct Code2SessionResponse {
    #[serde(default)]
    openid: Option<String>,
    #[serde(default)]
    session_key: Option<String>,
    #[serde(default)]
    unionid: Option<String>,
    #[serde(default)]
    errcode: Option<i64>,
    #[serde(default)]
    errmsg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_session_is_deterministic() {
        let client = WechatClient::new(WechatConfig::default());
        assert!(!client.is_enabled());

        let a = client.code_to_session("code-1").await.unwrap();
        let b = client.code_to_session("code-1").await.unwrap();
        let c = client.code_to_session("code-2").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a.open_id, c.open_id);
        assert!(a.open_id.starts_with("mock_"));
        assert_eq!(a.open_id.len(), 5 + 32);
    }

    #[tokio::test]
    async fn test_empty_code_rejected() {
        let client = WechatClient::new(WechatConfig::default());
        assert!(matches!(
            client.code_to_session("").await,
            Err(AppError::ValidationError(_))
        ));
    }
}
