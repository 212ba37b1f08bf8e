//! 应用运行配置加载。

use std::env;
use std::time::Duration;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    /// 未设置时使用内存存储。
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub alert_poll_interval_seconds: u64,
    /// 历史查询未给出时间范围时回看的小时数。
    pub history_default_hours: u64,
    pub seed_meters: bool,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr = env::var("EMS_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:3006".to_string());
        let database_url = read_optional("EMS_DATABASE_URL");
        let db_max_connections = read_u32_with_default("EMS_DB_MAX_CONNECTIONS", 8)?;
        let alert_poll_interval_seconds =
            read_u64_with_default("EMS_ALERT_POLL_INTERVAL_SECONDS", 10)?;
        if alert_poll_interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "EMS_ALERT_POLL_INTERVAL_SECONDS".to_string(),
                "0".to_string(),
            ));
        }
        let history_default_hours = read_u64_with_default("EMS_HISTORY_DEFAULT_HOURS", 24)?;
        let seed_meters = read_bool_with_default("EMS_SEED_METERS", true);

        Ok(Self {
            http_addr,
            database_url,
            db_max_connections,
            alert_poll_interval_seconds,
            history_default_hours,
            seed_meters,
        })
    }

    pub fn alert_poll_interval(&self) -> Duration {
        Duration::from_secs(self.alert_poll_interval_seconds)
    }
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn read_bool_with_default(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "on"),
        Err(_) => default,
    }
}
