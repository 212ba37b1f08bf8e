//! 能耗监测仪表盘服务入口。

use ems_alerting::{AlertPoller, Clock, SystemClock};
use ems_config::AppConfig;
use ems_dashboard::bootstrap::{build_state, seed_defaults};
use ems_dashboard::build_app;
use ems_telemetry::init_tracing;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let state = build_state(&config, clock).await?;
    if config.seed_meters {
        seed_defaults(&state).await?;
    }

    // 后台告警轮询，随服务一起退出
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = AlertPoller::new(state.alerts.clone(), config.alert_poll_interval())
        .spawn(shutdown_rx);

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(target: "ems.http", addr = %config.http_addr, "http_listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(err) = poller.await {
        warn!(target: "ems.alerting", error = %err, "alert_poller_join_failed");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(target: "ems.http", error = %err, "shutdown_signal_failed");
    }
    info!(target: "ems.http", "shutdown_requested");
}
