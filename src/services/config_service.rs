use crate::database::DbPool;
use crate::entities::config_entity as configs;
use crate::error::AppResult;
use crate::models::PlatformConfig;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

const CONFIG_ENABLED: i32 = 1;

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// 用配置行覆盖默认值，未知键忽略
pub fn build_platform_config<'a>(
    rows: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> PlatformConfig {
    let mut cfg = PlatformConfig::default();
    for (key, value) in rows {
        match key {
            "customer_service_phone" => cfg.customer_service_phone = value.to_string(),
            "privacy_policy_url" => cfg.privacy_policy_url = value.to_string(),
            "user_agreement_url" => cfg.user_agreement_url = value.to_string(),
            "about_us_url" => cfg.about_us_url = value.to_string(),
            "help_center_url" => cfg.help_center_url = value.to_string(),
            "app_version" => cfg.app_version = value.to_string(),
            "force_update" => cfg.force_update = parse_bool(value),
            "maintenance_mode" => cfg.maintenance_mode = parse_bool(value),
            "maintenance_message" => cfg.maintenance_message = value.to_string(),
            _ => {}
        }
    }
    cfg
}

#[derive(Clone)]
pub struct ConfigService {
    pool: DbPool,
}

impl ConfigService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn platform_config(&self) -> AppResult<PlatformConfig> {
        let rows = configs::Entity::find()
            .filter(configs::Column::Status.eq(CONFIG_ENABLED))
            .all(self.pool.as_ref())
            .await?;
        Ok(build_platform_config(
            rows.iter()
                .map(|r| (r.config_key.as_str(), r.config_value.as_str())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_rows() {
        let cfg = build_platform_config(std::iter::empty());
        assert_eq!(cfg.app_version, "1.0.0");
        assert!(!cfg.maintenance_mode);
    }

    #[test]
    fn test_rows_override_defaults() {
        let cfg = build_platform_config([
            ("customer_service_phone", "400-123-4567"),
            ("maintenance_mode", "1"),
            ("force_update", "false"),
            ("unknown_key", "x"),
        ]);
        assert_eq!(cfg.customer_service_phone, "400-123-4567");
        assert!(cfg.maintenance_mode);
        assert!(!cfg.force_update);
    }
}
