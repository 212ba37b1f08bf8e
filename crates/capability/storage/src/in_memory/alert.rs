//! 告警规则与已触发告警内存存储实现
//!
//! 规则与触发记录共用一把写锁，
//! “检查规则 + 检查未结束触发 + 插入”“关闭 + 更新规则”以及“关闭 + 删除规则”都在同一临界区内完成。

use crate::error::StorageError;
use crate::models::{AlertRuleRecord, AlertRuleUpdate, NewAlertRule, TriggeredAlertRecord};
use crate::traits::{AlertRuleStore, TriggeredAlertStore};
use std::collections::BTreeMap;
use std::sync::RwLock;

struct AlertState {
    next_alert_id: i64,
    next_triggered_id: i64,
    rules: BTreeMap<i64, AlertRuleRecord>,
    triggers: Vec<TriggeredAlertRecord>,
}

impl AlertState {
    fn close(&mut self, alert_id: i64, ended_at_ms: i64) -> u64 {
        let mut closed = 0;
        for trigger in self
            .triggers
            .iter_mut()
            .filter(|trigger| trigger.alert_id == alert_id && trigger.is_active)
        {
            trigger.is_active = false;
            trigger.end_ms = Some(ended_at_ms);
            closed += 1;
        }
        closed
    }
}

/// 告警内存存储
pub struct InMemoryAlertStore {
    state: RwLock<AlertState>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AlertState {
                next_alert_id: 1,
                next_triggered_id: 1,
                rules: BTreeMap::new(),
                triggers: Vec::new(),
            }),
        }
    }
}

impl Default for InMemoryAlertStore {
    fn default() -> Self {
        Self::new()
    }
}

fn newest_first(items: &mut [TriggeredAlertRecord]) {
    items.sort_by(|a, b| {
        b.start_ms
            .cmp(&a.start_ms)
            .then(b.triggered_id.cmp(&a.triggered_id))
    });
}

#[async_trait::async_trait]
impl AlertRuleStore for InMemoryAlertStore {
    async fn list_rules(&self) -> Result<Vec<AlertRuleRecord>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(state.rules.values().cloned().collect())
    }

    async fn list_active_rules(&self) -> Result<Vec<AlertRuleRecord>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(state
            .rules
            .values()
            .filter(|rule| rule.is_active)
            .cloned()
            .collect())
    }

    async fn find_rule(&self, alert_id: i64) -> Result<Option<AlertRuleRecord>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(state.rules.get(&alert_id).cloned())
    }

    async fn create_rule(&self, rule: NewAlertRule) -> Result<AlertRuleRecord, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let record = AlertRuleRecord {
            alert_id: state.next_alert_id,
            meter_id: rule.meter_id,
            parameter: rule.parameter,
            threshold: rule.threshold,
            message: rule.message,
            is_active: rule.is_active,
        };
        state.next_alert_id += 1;
        state.rules.insert(record.alert_id, record.clone());
        Ok(record)
    }

    async fn update_rule(
        &self,
        alert_id: i64,
        update: AlertRuleUpdate,
        changed_at_ms: i64,
    ) -> Result<Option<AlertRuleRecord>, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(mut rule) = state.rules.get(&alert_id).cloned() else {
            return Ok(None);
        };
        if update.changes_condition(&rule) {
            state.close(alert_id, changed_at_ms);
        }
        update.apply(&mut rule);
        state.rules.insert(alert_id, rule.clone());
        Ok(Some(rule))
    }

    async fn delete_rule(&self, alert_id: i64, closed_at_ms: i64) -> Result<bool, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if !state.rules.contains_key(&alert_id) {
            return Ok(false);
        }
        state.close(alert_id, closed_at_ms);
        state.rules.remove(&alert_id);
        Ok(true)
    }
}

#[async_trait::async_trait]
impl TriggeredAlertStore for InMemoryAlertStore {
    async fn open_trigger(
        &self,
        alert_id: i64,
        started_at_ms: i64,
    ) -> Result<Option<TriggeredAlertRecord>, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        let Some(rule) = state.rules.get(&alert_id).filter(|rule| rule.is_active) else {
            return Ok(None);
        };
        let (meter_id, message) = (rule.meter_id, rule.message.clone());
        if state
            .triggers
            .iter()
            .any(|trigger| trigger.alert_id == alert_id && trigger.is_active)
        {
            return Ok(None);
        }
        let record = TriggeredAlertRecord {
            triggered_id: state.next_triggered_id,
            alert_id,
            meter_id,
            start_ms: started_at_ms,
            end_ms: None,
            message,
            is_active: true,
        };
        state.next_triggered_id += 1;
        state.triggers.push(record.clone());
        Ok(Some(record))
    }

    async fn close_triggers(&self, alert_id: i64, ended_at_ms: i64) -> Result<u64, StorageError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(state.close(alert_id, ended_at_ms))
    }

    async fn list_active_triggers(&self) -> Result<Vec<TriggeredAlertRecord>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<TriggeredAlertRecord> = state
            .triggers
            .iter()
            .filter(|trigger| trigger.is_active)
            .cloned()
            .collect();
        newest_first(&mut items);
        Ok(items)
    }

    async fn list_triggers_for_rule(
        &self,
        alert_id: i64,
    ) -> Result<Vec<TriggeredAlertRecord>, StorageError> {
        let state = self
            .state
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut items: Vec<TriggeredAlertRecord> = state
            .triggers
            .iter()
            .filter(|trigger| trigger.alert_id == alert_id)
            .cloned()
            .collect();
        newest_first(&mut items);
        Ok(items)
    }
}
