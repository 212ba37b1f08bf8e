//! 路由定义
//!
//! 集中管理所有 API 路由，将路径映射到对应的 handlers。
//! 路由包括：
//! - 健康检查与指标：/health, /metrics
//! - 电表与图表数据：/api/meters, /api/live-data/*, /api/historical-data/*, /api/total-kwh-latest
//! - 读数：/api/events/*（含录入、全部刷新、表格导入导出）
//! - 告警：/api/alerts/*

use super::AppState;
use super::handlers::*;
use axum::{
    Router,
    routing::{get, post, put},
};

/// 创建 API 路由
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(get_metrics))
        .route("/api/meters", get(list_meters))
        .route("/api/live-data/:meter_id", get(get_live_data))
        .route("/api/historical-data/:meter_id", get(get_historical_data))
        .route("/api/total-kwh-latest", get(get_total_kwh_latest))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/add-event", post(create_event))
        .route("/api/events/refresh-all", post(refresh_all_events))
        .route("/api/events/import", post(import_events))
        .route("/api/events/export", get(export_events))
        .route("/api/alerts/parameters", get(list_alert_parameters))
        .route(
            "/api/alerts/rules",
            get(list_alert_rules).post(create_alert_rule),
        )
        .route(
            "/api/alerts/rules/:alert_id",
            put(update_alert_rule).delete(delete_alert_rule),
        )
        .route(
            "/api/alerts/rules/:alert_id/history",
            get(get_alert_rule_history),
        )
        .route("/api/alerts/triggered", get(list_triggered_alerts))
}
