//! 能耗监测仪表盘 HTTP 服务。
//!
//! - [`routes`]：路由表
//! - [`handlers`]：电表、读数、导入导出、告警、指标
//! - [`middleware`]：request_id/trace_id 注入
//! - [`bootstrap`]：按配置装配存储与默认数据

pub mod bootstrap;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod utils;

use axum::Router;
use ems_alerting::{AlertService, Clock};
use ems_storage::{
    EventStore, InMemoryAlertStore, InMemoryEventStore, InMemoryMeterStore, MeterStore,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 各 handler 共享的状态。
#[derive(Clone)]
pub struct AppState {
    pub meters: Arc<dyn MeterStore>,
    pub events: Arc<dyn EventStore>,
    pub alerts: Arc<AlertService>,
    pub clock: Arc<dyn Clock>,
    /// 历史查询缺省回看的小时数
    pub history_default_hours: u64,
}

impl AppState {
    /// 全部使用内存存储。
    pub fn in_memory(
        meters: InMemoryMeterStore,
        clock: Arc<dyn Clock>,
        history_default_hours: u64,
    ) -> Self {
        let meters: Arc<dyn MeterStore> = Arc::new(meters);
        let events: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        let alert_store = Arc::new(InMemoryAlertStore::new());
        let alerts = Arc::new(AlertService::new(
            meters.clone(),
            alert_store.clone(),
            alert_store,
            events.clone(),
            clock.clone(),
        ));
        Self {
            meters,
            events,
            alerts,
            clock,
            history_default_hours,
        }
    }
}

/// 组装完整应用：路由 + 请求追踪。
pub fn build_app(state: AppState) -> Router {
    routes::create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(middleware::request_context))
}
