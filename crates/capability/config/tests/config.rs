use ems_config::AppConfig;
use std::time::Duration;

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("EMS_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("EMS_DATABASE_URL", "");
        std::env::set_var("EMS_ALERT_POLL_INTERVAL_SECONDS", "5");
        std::env::set_var("EMS_SEED_METERS", "off");
        std::env::remove_var("EMS_DB_MAX_CONNECTIONS");
        std::env::remove_var("EMS_HISTORY_DEFAULT_HOURS");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert!(config.database_url.is_none());
    assert_eq!(config.db_max_connections, 8);
    assert_eq!(config.alert_poll_interval(), Duration::from_secs(5));
    assert_eq!(config.history_default_hours, 24);
    assert!(!config.seed_meters);
}
