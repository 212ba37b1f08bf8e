//! 数据库表结构
//!
//! 启动时调用 [`apply_schema`]，全部语句幂等（`if not exists`）。
//!
//! - `meters`：电表
//! - `events`：读数（只追加）
//! - `alert_rules`：告警规则
//! - `triggered_alerts`：已触发告警，`triggered_alerts_one_active` 保证每条规则至多一条未结束记录
//!
//! `triggered_alerts.alert_id` 不设外键，规则删除后关闭的历史记录保留。

use crate::error::StorageError;
use sqlx::PgPool;
use tracing::info;

const STATEMENTS: &[&str] = &[
    "create table if not exists meters ( \
        meter_id bigint primary key, \
        location text not null, \
        description text, \
        installed_at timestamptz, \
        last_calibrated_at timestamptz \
     )",
    "create table if not exists events ( \
        event_id bigserial primary key, \
        meter_id bigint not null references meters (meter_id), \
        ts timestamptz not null, \
        current_l1 double precision, \
        current_l2 double precision, \
        current_l3 double precision, \
        voltage_l1 double precision, \
        voltage_l2 double precision, \
        voltage_l3 double precision, \
        power_factor_l1 double precision, \
        power_factor_l2 double precision, \
        power_factor_l3 double precision, \
        avg_current double precision, \
        avg_voltage double precision, \
        avg_power_factor double precision, \
        total_kw double precision, \
        total_kwh double precision \
     )",
    "create index if not exists idx_events_meter_ts on events (meter_id, ts desc, event_id desc)",
    "create table if not exists alert_rules ( \
        alert_id bigserial primary key, \
        meter_id bigint not null references meters (meter_id), \
        parameter text not null, \
        threshold double precision not null, \
        message text not null, \
        is_active boolean not null default true \
     )",
    "create table if not exists triggered_alerts ( \
        triggered_id bigserial primary key, \
        alert_id bigint not null, \
        meter_id bigint not null, \
        start_time timestamptz not null, \
        end_time timestamptz, \
        message text not null, \
        is_active boolean not null default true \
     )",
    "create unique index if not exists triggered_alerts_one_active \
     on triggered_alerts (alert_id) where is_active",
    "create index if not exists idx_triggered_alerts_alert \
     on triggered_alerts (alert_id, start_time desc)",
];

/// 建表（幂等）
pub async fn apply_schema(pool: &PgPool) -> Result<(), StorageError> {
    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!(target: "ems.storage", statements = STATEMENTS.len(), "schema_applied");
    Ok(())
}
