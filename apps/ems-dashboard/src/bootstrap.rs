//! 启动装配：按配置选择存储，写入默认电表与示例规则。

use crate::AppState;
use ems_alerting::{AlertError, AlertService, Clock};
use ems_config::AppConfig;
use ems_storage::{
    EventStore, InMemoryMeterStore, MeterStore, PgAlertStore, PgEventStore, PgMeterStore,
    StorageError, apply_schema, connect_pool, default_alert_rules, default_meters,
};
use std::sync::Arc;
use tracing::info;

/// 配置了 `EMS_DATABASE_URL` 时连接 Postgres 并建表，否则使用内存存储。
pub async fn build_state(
    config: &AppConfig,
    clock: Arc<dyn Clock>,
) -> Result<AppState, StorageError> {
    let Some(database_url) = config.database_url.as_deref() else {
        info!(target: "ems.storage", "storage_in_memory");
        return Ok(AppState::in_memory(
            InMemoryMeterStore::new(),
            clock,
            config.history_default_hours,
        ));
    };

    let pool = connect_pool(database_url, config.db_max_connections).await?;
    apply_schema(&pool).await?;
    info!(
        target: "ems.storage",
        max_connections = config.db_max_connections,
        "storage_postgres"
    );

    let meters: Arc<dyn MeterStore> = Arc::new(PgMeterStore::new(pool.clone()));
    let events: Arc<dyn EventStore> = Arc::new(PgEventStore::new(pool.clone()));
    let alert_store = Arc::new(PgAlertStore::new(pool));
    let alerts = Arc::new(AlertService::new(
        meters.clone(),
        alert_store.clone(),
        alert_store,
        events.clone(),
        clock.clone(),
    ));
    Ok(AppState {
        meters,
        events,
        alerts,
        clock,
        history_default_hours: config.history_default_hours,
    })
}

/// 写入默认电表；规则表为空时再写入示例规则。可重复执行。
pub async fn seed_defaults(state: &AppState) -> Result<(), AlertError> {
    let meters = default_meters();
    let meter_count = meters.len();
    for meter in meters {
        state.meters.upsert_meter(meter).await?;
    }

    let mut rule_count = 0;
    if state.alerts.list_rules().await?.is_empty() {
        for rule in default_alert_rules() {
            state.alerts.create_rule(rule).await?;
            rule_count += 1;
        }
    }
    info!(
        target: "ems.storage",
        meters = meter_count,
        rules = rule_count,
        "seed_applied"
    );
    Ok(())
}
