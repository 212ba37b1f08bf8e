//! Postgres 告警规则与已触发告警实现
//!
//! - 打开触发为单条条件插入：规则须存在且启用（`for share` 锁住规则行），
//!   `triggered_alerts_one_active` 冲突时不写入。
//! - 更新、删除规则都在同一事务内先 `for update` 锁住规则行；
//!   更新改动了电表、参数、阈值或消息时先关闭未结束触发，删除时关闭触发后删除规则。

use crate::error::StorageError;
use crate::models::{AlertRuleRecord, AlertRuleUpdate, NewAlertRule, TriggeredAlertRecord};
use crate::traits::{AlertRuleStore, TriggeredAlertStore};
use domain::EventField;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

const RULE_COLUMNS: &str = "alert_id, meter_id, parameter, threshold, message, is_active";

const TRIGGER_COLUMNS: &str = "triggered_id, alert_id, meter_id, \
     (extract(epoch from start_time) * 1000)::bigint as start_ms, \
     (extract(epoch from end_time) * 1000)::bigint as end_ms, \
     message, is_active";

pub struct PgAlertStore {
    pub pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn rule_from_row(row: &PgRow) -> Result<AlertRuleRecord, StorageError> {
    let parameter: String = row.try_get("parameter")?;
    let parameter = parameter
        .parse::<EventField>()
        .map_err(|err| StorageError::new(err.to_string()))?;
    Ok(AlertRuleRecord {
        alert_id: row.try_get("alert_id")?,
        meter_id: row.try_get("meter_id")?,
        parameter,
        threshold: row.try_get("threshold")?,
        message: row.try_get("message")?,
        is_active: row.try_get("is_active")?,
    })
}

fn trigger_from_row(row: &PgRow) -> Result<TriggeredAlertRecord, StorageError> {
    Ok(TriggeredAlertRecord {
        triggered_id: row.try_get("triggered_id")?,
        alert_id: row.try_get("alert_id")?,
        meter_id: row.try_get("meter_id")?,
        start_ms: row.try_get("start_ms")?,
        end_ms: row.try_get("end_ms")?,
        message: row.try_get("message")?,
        is_active: row.try_get("is_active")?,
    })
}

#[async_trait::async_trait]
impl AlertRuleStore for PgAlertStore {
    async fn list_rules(&self) -> Result<Vec<AlertRuleRecord>, StorageError> {
        let sql = format!("select {RULE_COLUMNS} from alert_rules order by alert_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(rule_from_row).collect()
    }

    async fn list_active_rules(&self) -> Result<Vec<AlertRuleRecord>, StorageError> {
        let sql =
            format!("select {RULE_COLUMNS} from alert_rules where is_active order by alert_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(rule_from_row).collect()
    }

    async fn find_rule(&self, alert_id: i64) -> Result<Option<AlertRuleRecord>, StorageError> {
        let sql = format!("select {RULE_COLUMNS} from alert_rules where alert_id = $1");
        let row = sqlx::query(&sql)
            .bind(alert_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(rule_from_row).transpose()
    }

    async fn create_rule(&self, rule: NewAlertRule) -> Result<AlertRuleRecord, StorageError> {
        let sql = format!(
            "insert into alert_rules (meter_id, parameter, threshold, message, is_active) \
             values ($1, $2, $3, $4, $5) \
             returning {RULE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(rule.meter_id)
            .bind(rule.parameter.as_str())
            .bind(rule.threshold)
            .bind(&rule.message)
            .bind(rule.is_active)
            .fetch_one(&self.pool)
            .await?;
        rule_from_row(&row)
    }

    async fn update_rule(
        &self,
        alert_id: i64,
        update: AlertRuleUpdate,
        changed_at_ms: i64,
    ) -> Result<Option<AlertRuleRecord>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let sql = format!("select {RULE_COLUMNS} from alert_rules where alert_id = $1 for update");
        let current = sqlx::query(&sql)
            .bind(alert_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(current) = current.as_ref().map(rule_from_row).transpose()? else {
            tx.rollback().await?;
            return Ok(None);
        };
        if update.changes_condition(&current) {
            let closed = sqlx::query(
                "update triggered_alerts set is_active = false, end_time = to_timestamp($2 / 1000.0) \
                 where alert_id = $1 and is_active",
            )
            .bind(alert_id)
            .bind(changed_at_ms as f64)
            .execute(&mut *tx)
            .await?;
            debug!(
                target: "ems.storage",
                alert_id,
                closed = closed.rows_affected(),
                "alert_rule_changed"
            );
        }
        let sql = format!(
            "update alert_rules set \
             meter_id = coalesce($2, meter_id), \
             parameter = coalesce($3, parameter), \
             threshold = coalesce($4, threshold), \
             message = coalesce($5, message), \
             is_active = coalesce($6, is_active) \
             where alert_id = $1 \
             returning {RULE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(alert_id)
            .bind(update.meter_id)
            .bind(update.parameter.map(|field| field.as_str()))
            .bind(update.threshold)
            .bind(&update.message)
            .bind(update.is_active)
            .fetch_one(&mut *tx)
            .await?;
        let updated = rule_from_row(&row)?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_rule(&self, alert_id: i64, closed_at_ms: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let locked = sqlx::query("select alert_id from alert_rules where alert_id = $1 for update")
            .bind(alert_id)
            .fetch_optional(&mut *tx)
            .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }
        let closed = sqlx::query(
            "update triggered_alerts set is_active = false, end_time = to_timestamp($2 / 1000.0) \
             where alert_id = $1 and is_active",
        )
        .bind(alert_id)
        .bind(closed_at_ms as f64)
        .execute(&mut *tx)
        .await?;
        sqlx::query("delete from alert_rules where alert_id = $1")
            .bind(alert_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!(
            target: "ems.storage",
            alert_id,
            closed = closed.rows_affected(),
            "alert_rule_deleted"
        );
        Ok(true)
    }
}

#[async_trait::async_trait]
impl TriggeredAlertStore for PgAlertStore {
    async fn open_trigger(
        &self,
        alert_id: i64,
        started_at_ms: i64,
    ) -> Result<Option<TriggeredAlertRecord>, StorageError> {
        let sql = format!(
            "insert into triggered_alerts (alert_id, meter_id, start_time, message, is_active) \
             select r.alert_id, r.meter_id, to_timestamp($2 / 1000.0), r.message, true \
             from alert_rules r \
             where r.alert_id = $1 and r.is_active \
             for share \
             on conflict (alert_id) where is_active do nothing \
             returning {TRIGGER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(alert_id)
            .bind(started_at_ms as f64)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(trigger_from_row).transpose()
    }

    async fn close_triggers(&self, alert_id: i64, ended_at_ms: i64) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "update triggered_alerts set is_active = false, end_time = to_timestamp($2 / 1000.0) \
             where alert_id = $1 and is_active",
        )
        .bind(alert_id)
        .bind(ended_at_ms as f64)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_active_triggers(&self) -> Result<Vec<TriggeredAlertRecord>, StorageError> {
        let sql = format!(
            "select {TRIGGER_COLUMNS} from triggered_alerts \
             where is_active order by start_time desc, triggered_id desc"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(trigger_from_row).collect()
    }

    async fn list_triggers_for_rule(
        &self,
        alert_id: i64,
    ) -> Result<Vec<TriggeredAlertRecord>, StorageError> {
        let sql = format!(
            "select {TRIGGER_COLUMNS} from triggered_alerts \
             where alert_id = $1 order by start_time desc, triggered_id desc"
        );
        let rows = sqlx::query(&sql)
            .bind(alert_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(trigger_from_row).collect()
    }
}
