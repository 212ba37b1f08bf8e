//! 存储层数据模型
//!
//! 时间统一为 UTC 毫秒时间戳（`*_ms`）。

use domain::{EventField, MeterId, MeterReading};

/// 电表记录
#[derive(Debug, Clone, PartialEq)]
pub struct MeterRecord {
    pub meter_id: MeterId,
    pub location: String,
    pub description: Option<String>,
    pub installed_at_ms: Option<i64>,
    pub last_calibrated_at_ms: Option<i64>,
}

/// 读数记录（只追加）
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub event_id: i64,
    pub meter_id: MeterId,
    pub ts_ms: i64,
    pub reading: MeterReading,
}

/// 待写入的读数，`event_id` 由存储分配
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub meter_id: MeterId,
    pub ts_ms: i64,
    pub reading: MeterReading,
}

/// 读数查询条件
///
/// `from_ms` / `to_ms` 均为闭区间边界。
#[derive(Debug, Clone, Copy, Default)]
pub struct EventQuery {
    pub meter_id: Option<MeterId>,
    pub from_ms: Option<i64>,
    pub to_ms: Option<i64>,
    pub order: TimeOrder,
}

/// 时间排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeOrder {
    #[default]
    Asc,
    Desc,
}

/// 告警规则记录
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRuleRecord {
    pub alert_id: i64,
    pub meter_id: MeterId,
    pub parameter: EventField,
    pub threshold: f64,
    pub message: String,
    pub is_active: bool,
}

/// 新建告警规则
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlertRule {
    pub meter_id: MeterId,
    pub parameter: EventField,
    pub threshold: f64,
    pub message: String,
    pub is_active: bool,
}

/// 告警规则更新（仅覆盖 `Some` 字段）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertRuleUpdate {
    pub meter_id: Option<MeterId>,
    pub parameter: Option<EventField>,
    pub threshold: Option<f64>,
    pub message: Option<String>,
    pub is_active: Option<bool>,
}

impl AlertRuleUpdate {
    /// 是否改动了触发记录所引用的内容（电表、参数、阈值、消息）
    pub fn changes_condition(&self, rule: &AlertRuleRecord) -> bool {
        self.meter_id.is_some_and(|meter_id| meter_id != rule.meter_id)
            || self.parameter.is_some_and(|parameter| parameter != rule.parameter)
            || self.threshold.is_some_and(|threshold| threshold != rule.threshold)
            || self.message.as_ref().is_some_and(|message| *message != rule.message)
    }

    pub fn apply(&self, rule: &mut AlertRuleRecord) {
        if let Some(meter_id) = self.meter_id {
            rule.meter_id = meter_id;
        }
        if let Some(parameter) = self.parameter {
            rule.parameter = parameter;
        }
        if let Some(threshold) = self.threshold {
            rule.threshold = threshold;
        }
        if let Some(message) = &self.message {
            rule.message = message.clone();
        }
        if let Some(is_active) = self.is_active {
            rule.is_active = is_active;
        }
    }
}

/// 已触发告警记录
///
/// 同一 `alert_id` 任一时刻至多一条 `is_active = true`。
/// 关闭后的记录作为历史保留，规则删除后仍可存在。
#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAlertRecord {
    pub triggered_id: i64,
    pub alert_id: i64,
    pub meter_id: MeterId,
    pub start_ms: i64,
    pub end_ms: Option<i64>,
    pub message: String,
    pub is_active: bool,
}
