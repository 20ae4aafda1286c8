use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub wechat: WechatConfig,
    #[serde(default)]
    pub order: OrderConfig,
    #[serde(default)]
    pub referral: ReferralConfig,
    #[serde(default)]
    pub user: UserConfig,
    #[serde(default)]
    pub sse: SseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
}

fn default_min_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    8
}

fn default_max_lifetime() -> u64 {
    3600
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// 小程序配置，app_id 为空时登录走离线模式（openId 由 code 派生）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WechatConfig {
    pub app_id: String,
    pub app_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfig {
    /// 下单后多少分钟内未支付自动取消
    pub pay_timeout_minutes: i64,
    /// 模拟支付签名密钥
    pub pay_sign_key: String,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            pay_timeout_minutes: 30,
            pay_sign_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    pub qrcode_base_url: String,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            qrcode_base_url: "https://example.com/qrcode".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// 绑定手机号时使用的固定验证码（未接入短信服务）
    pub phone_verify_code: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            phone_verify_code: "123456".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// 每个订阅者的缓冲区大小，写满即断开
    pub client_buffer: usize,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self { client_buffer: 32 }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 80u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 100u32),
                        min_connections: get_env_parse("DB_MIN_CONNECTIONS", 5u32),
                        connect_timeout_secs: get_env_parse("DB_CONNECT_TIMEOUT", 8u64),
                        max_lifetime_secs: get_env_parse("DB_MAX_LIFETIME", 3600u64),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    wechat: WechatConfig {
                        app_id: get_env("WX_APP_ID").unwrap_or_default(),
                        app_secret: get_env("WX_APP_SECRET").unwrap_or_default(),
                    },
                    order: OrderConfig {
                        pay_timeout_minutes: get_env_parse("ORDER_PAY_TIMEOUT_MINUTES", 30i64),
                        pay_sign_key: get_env("ORDER_PAY_SIGN_KEY").unwrap_or_default(),
                    },
                    referral: ReferralConfig {
                        qrcode_base_url: get_env("REFERRAL_QRCODE_BASE_URL")
                            .unwrap_or_else(|| ReferralConfig::default().qrcode_base_url),
                    },
                    user: UserConfig {
                        phone_verify_code: get_env("PHONE_VERIFY_CODE")
                            .unwrap_or_else(|| UserConfig::default().phone_verify_code),
                    },
                    sse: SseConfig {
                        client_buffer: get_env_parse("SSE_CLIENT_BUFFER", 32usize),
                    },
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            config.jwt.refresh_token_expires_in = n;
        }
        if let Ok(v) = env::var("WX_APP_ID") {
            config.wechat.app_id = v;
        }
        if let Ok(v) = env::var("WX_APP_SECRET") {
            config.wechat.app_secret = v;
        }
        if let Ok(v) = env::var("ORDER_PAY_TIMEOUT_MINUTES")
            && let Ok(n) = v.parse()
        {
            config.order.pay_timeout_minutes = n;
        }
        if let Ok(v) = env::var("ORDER_PAY_SIGN_KEY") {
            config.order.pay_sign_key = v;
        }
        if let Ok(v) = env::var("REFERRAL_QRCODE_BASE_URL") {
            config.referral.qrcode_base_url = v;
        }
        if let Ok(v) = env::var("PHONE_VERIFY_CODE") {
            config.user.phone_verify_code = v;
        }
        if let Ok(v) = env::var("SSE_CLIENT_BUFFER")
            && let Ok(n) = v.parse()
        {
            config.sse.client_buffer = n;
        }

        if config.order.pay_timeout_minutes <= 0 {
            return Err("order.pay_timeout_minutes 必须大于 0".into());
        }
        if config.sse.client_buffer == 0 {
            return Err("sse.client_buffer 必须大于 0".into());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_toml_uses_section_defaults() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [database]
            url = "mysql://root:pw@localhost:3306/wxapp"
            max_connections = 20

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.database.min_connections, 5);
        assert_eq!(config.database.max_lifetime_secs, 3600);
        assert_eq!(config.order.pay_timeout_minutes, 30);
        assert_eq!(config.user.phone_verify_code, "123456");
        assert_eq!(config.sse.client_buffer, 32);
        assert!(config.wechat.app_id.is_empty());
    }

    #[test]
    fn test_parse_order_section() {
        let raw = r#"
            [server]
            host = "0.0.0.0"
            port = 80

            [database]
            url = "mysql://localhost/wxapp"
            max_connections = 200

            [jwt]
            secret = "s"
            access_token_expires_in = 60
            refresh_token_expires_in = 120

            [order]
            pay_timeout_minutes = 15
            pay_sign_key = "k"
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.order.pay_timeout_minutes, 15);
        assert_eq!(config.order.pay_sign_key, "k");
    }
}
