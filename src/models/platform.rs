use serde::Serialize;
use utoipa::ToSchema;

/// 平台配置，由 configs 表中启用的键值组装
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    pub customer_service_phone: String,
    pub privacy_policy_url: String,
    pub user_agreement_url: String,
    pub about_us_url: String,
    pub help_center_url: String,
    pub app_version: String,
    pub force_update: bool,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            customer_service_phone: "400-000-0000".to_string(),
            privacy_policy_url: String::new(),
            user_agreement_url: String::new(),
            about_us_url: String::new(),
            help_center_url: String::new(),
            app_version: "1.0.0".to_string(),
            force_update: false,
            maintenance_mode: false,
            maintenance_message: "系统维护中，请稍后再试".to_string(),
        }
    }
}
