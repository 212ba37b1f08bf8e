//! 单条规则的评估与恢复。
//!
//! 条件成立当且仅当：规则启用、该表最新读数存在、对应字段非空且严格大于阈值。
//! 成立时打开触发（已有未结束触发则不动），不成立时关闭该规则全部未结束触发。
//! 每次评估至多一次插入或一次更新。

use crate::clock::Clock;
use crate::error::AlertError;
use ems_storage::{AlertRuleRecord, AlertRuleStore, EventStore, TriggeredAlertRecord, TriggeredAlertStore};
use ems_telemetry::{
    record_alert_evaluation, record_alert_evaluation_failure, record_trigger_opened,
    record_triggers_closed,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 一次评估的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// 新打开了一条触发。
    Opened(TriggeredAlertRecord),
    /// 条件成立但未写入：已有未结束触发，或规则在评估期间被删除/停用。
    AlreadyOpen,
    /// 条件不成立，关闭了若干未结束触发。
    Closed(u64),
    /// 条件不成立且没有未结束触发。
    Idle,
    /// 规则不存在。
    RuleMissing,
}

/// 告警评估器。
#[derive(Clone)]
pub struct AlertEvaluator {
    rules: Arc<dyn AlertRuleStore>,
    triggers: Arc<dyn TriggeredAlertStore>,
    events: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
}

impl AlertEvaluator {
    pub fn new(
        rules: Arc<dyn AlertRuleStore>,
        triggers: Arc<dyn TriggeredAlertStore>,
        events: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rules,
            triggers,
            events,
            clock,
        }
    }

    pub async fn evaluate(&self, alert_id: i64) -> Result<Evaluation, AlertError> {
        record_alert_evaluation();
        let result = self.evaluate_rule(alert_id).await;
        if result.is_err() {
            record_alert_evaluation_failure();
        }
        result
    }

    async fn evaluate_rule(&self, alert_id: i64) -> Result<Evaluation, AlertError> {
        let Some(rule) = self.rules.find_rule(alert_id).await? else {
            debug!(target: "ems.alerting", alert_id, "alert_rule_missing");
            return Ok(Evaluation::RuleMissing);
        };
        let latest = self.events.latest_event(rule.meter_id).await?;
        let value = latest.and_then(|event| event.reading.value(rule.parameter));

        if condition_holds(&rule, value) {
            let opened = self
                .triggers
                .open_trigger(rule.alert_id, self.clock.now_ms())
                .await?;
            return Ok(match opened {
                Some(record) => {
                    record_trigger_opened();
                    info!(
                        target: "ems.alerting",
                        alert_id = rule.alert_id,
                        meter_id = rule.meter_id,
                        parameter = %rule.parameter,
                        threshold = rule.threshold,
                        value = ?value,
                        triggered_id = record.triggered_id,
                        "alert_triggered"
                    );
                    Evaluation::Opened(record)
                }
                None => Evaluation::AlreadyOpen,
            });
        }

        let closed = self
            .triggers
            .close_triggers(rule.alert_id, self.clock.now_ms())
            .await?;
        if closed == 0 {
            return Ok(Evaluation::Idle);
        }
        record_triggers_closed(closed);
        info!(
            target: "ems.alerting",
            alert_id = rule.alert_id,
            meter_id = rule.meter_id,
            parameter = %rule.parameter,
            value = ?value,
            closed,
            "alert_recovered"
        );
        Ok(Evaluation::Closed(closed))
    }
}

/// 缺失或为空的值永不触发；NaN 比较结果为 false。
pub fn condition_holds(rule: &AlertRuleRecord, value: Option<f64>) -> bool {
    rule.is_active && value.is_some_and(|value| value > rule.threshold)
}
