//! 告警规则服务（增删改 + 立即评估）。

use crate::clock::Clock;
use crate::error::AlertError;
use crate::evaluator::{AlertEvaluator, Evaluation};
use domain::MeterId;
use ems_storage::{
    AlertRuleRecord, AlertRuleStore, AlertRuleUpdate, EventStore, MeterStore, NewAlertRule,
    TriggeredAlertRecord, TriggeredAlertStore,
};
use std::sync::Arc;
use tracing::{info, warn};

/// 一轮批量评估的统计。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub evaluated: usize,
    pub failed: usize,
}

/// 告警规则服务。
///
/// 规则变更后立即评估该规则。改动电表、参数、阈值或消息时，
/// 未结束的触发随更新一起关闭，再由评估按新规则重新打开。
/// 删除规则时先关闭其未结束触发。
#[derive(Clone)]
pub struct AlertService {
    meters: Arc<dyn MeterStore>,
    rules: Arc<dyn AlertRuleStore>,
    triggers: Arc<dyn TriggeredAlertStore>,
    evaluator: AlertEvaluator,
    clock: Arc<dyn Clock>,
}

impl AlertService {
    pub fn new(
        meters: Arc<dyn MeterStore>,
        rules: Arc<dyn AlertRuleStore>,
        triggers: Arc<dyn TriggeredAlertStore>,
        events: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let evaluator = AlertEvaluator::new(
            rules.clone(),
            triggers.clone(),
            events,
            clock.clone(),
        );
        Self {
            meters,
            rules,
            triggers,
            evaluator,
            clock,
        }
    }

    pub async fn list_rules(&self) -> Result<Vec<AlertRuleRecord>, AlertError> {
        Ok(self.rules.list_rules().await?)
    }

    pub async fn find_rule(&self, alert_id: i64) -> Result<Option<AlertRuleRecord>, AlertError> {
        Ok(self.rules.find_rule(alert_id).await?)
    }

    pub async fn create_rule(&self, rule: NewAlertRule) -> Result<AlertRuleRecord, AlertError> {
        ensure_threshold(rule.threshold)?;
        let message = ensure_message(&rule.message)?;
        self.ensure_meter(rule.meter_id).await?;
        let created = self
            .rules
            .create_rule(NewAlertRule { message, ..rule })
            .await?;
        info!(
            target: "ems.alerting",
            alert_id = created.alert_id,
            meter_id = created.meter_id,
            parameter = %created.parameter,
            threshold = created.threshold,
            "alert_rule_created"
        );
        self.evaluate_after_change(created.alert_id).await;
        Ok(created)
    }

    pub async fn update_rule(
        &self,
        alert_id: i64,
        update: AlertRuleUpdate,
    ) -> Result<Option<AlertRuleRecord>, AlertError> {
        if let Some(threshold) = update.threshold {
            ensure_threshold(threshold)?;
        }
        let message = match &update.message {
            Some(message) => Some(ensure_message(message)?),
            None => None,
        };
        if let Some(meter_id) = update.meter_id {
            self.ensure_meter(meter_id).await?;
        }
        let updated = self
            .rules
            .update_rule(
                alert_id,
                AlertRuleUpdate { message, ..update },
                self.clock.now_ms(),
            )
            .await?;
        let Some(updated) = updated else {
            return Ok(None);
        };
        info!(
            target: "ems.alerting",
            alert_id,
            is_active = updated.is_active,
            "alert_rule_updated"
        );
        self.evaluate_after_change(alert_id).await;
        Ok(Some(updated))
    }

    /// 关闭未结束触发并删除规则；规则不存在返回 false。
    pub async fn delete_rule(&self, alert_id: i64) -> Result<bool, AlertError> {
        let deleted = self
            .rules
            .delete_rule(alert_id, self.clock.now_ms())
            .await?;
        if deleted {
            info!(target: "ems.alerting", alert_id, "alert_rule_deleted");
        }
        Ok(deleted)
    }

    pub async fn list_active_triggers(&self) -> Result<Vec<TriggeredAlertRecord>, AlertError> {
        Ok(self.triggers.list_active_triggers().await?)
    }

    /// 规则的全部触发历史（含规则已删除后的关闭记录）。
    pub async fn list_rule_history(
        &self,
        alert_id: i64,
    ) -> Result<Vec<TriggeredAlertRecord>, AlertError> {
        Ok(self.triggers.list_triggers_for_rule(alert_id).await?)
    }

    pub async fn evaluate(&self, alert_id: i64) -> Result<Evaluation, AlertError> {
        self.evaluator.evaluate(alert_id).await
    }

    /// 评估全部启用规则；单条失败只记录，不影响其余规则。
    pub async fn evaluate_active_rules(&self) -> Result<PollSummary, AlertError> {
        let rules = self.rules.list_active_rules().await?;
        let mut summary = PollSummary::default();
        for rule in rules {
            summary.evaluated += 1;
            if let Err(err) = self.evaluator.evaluate(rule.alert_id).await {
                summary.failed += 1;
                warn!(
                    target: "ems.alerting",
                    alert_id = rule.alert_id,
                    meter_id = rule.meter_id,
                    error = %err,
                    "alert_evaluation_failed"
                );
            }
        }
        Ok(summary)
    }

    async fn evaluate_after_change(&self, alert_id: i64) {
        if let Err(err) = self.evaluator.evaluate(alert_id).await {
            warn!(
                target: "ems.alerting",
                alert_id,
                error = %err,
                "alert_evaluation_failed"
            );
        }
    }

    async fn ensure_meter(&self, meter_id: MeterId) -> Result<(), AlertError> {
        if self.meters.find_meter(meter_id).await?.is_none() {
            return Err(AlertError::Invalid(format!("unknown meter: {meter_id}")));
        }
        Ok(())
    }
}

fn ensure_threshold(threshold: f64) -> Result<(), AlertError> {
    if !threshold.is_finite() {
        return Err(AlertError::Invalid("threshold must be a finite number".to_string()));
    }
    Ok(())
}

fn ensure_message(message: &str) -> Result<String, AlertError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(AlertError::Invalid("message is required".to_string()));
    }
    Ok(message.to_string())
}
