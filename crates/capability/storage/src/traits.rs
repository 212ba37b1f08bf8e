//! 存储接口 Trait 定义
//!
//! - MeterStore：电表
//! - EventStore：读数
//! - AlertRuleStore：告警规则
//! - TriggeredAlertStore：已触发告警
//!
//! 所有接口返回 StorageError，使用 async_trait 支持动态分发。

use crate::error::StorageError;
use crate::models::{
    AlertRuleRecord, AlertRuleUpdate, EventQuery, EventRecord, MeterRecord, NewAlertRule, NewEvent,
    TriggeredAlertRecord,
};
use async_trait::async_trait;
use domain::MeterId;

/// 电表存储接口
#[async_trait]
pub trait MeterStore: Send + Sync {
    /// 按 meter_id 升序列出全部电表
    async fn list_meters(&self) -> Result<Vec<MeterRecord>, StorageError>;

    async fn find_meter(&self, meter_id: MeterId) -> Result<Option<MeterRecord>, StorageError>;

    /// 按 meter_id 幂等写入
    async fn upsert_meter(&self, record: MeterRecord) -> Result<MeterRecord, StorageError>;
}

/// 读数存储接口（只追加）
#[async_trait]
pub trait EventStore: Send + Sync {
    /// 追加一条读数，返回分配了 event_id 的记录
    async fn append_event(&self, event: NewEvent) -> Result<EventRecord, StorageError>;

    /// 批量追加，全部成功或全部失败
    async fn append_events(&self, events: &[NewEvent]) -> Result<usize, StorageError>;

    /// 指定电表的最新读数
    ///
    /// 按时间倒序，同一时间取 event_id 较大者。
    async fn latest_event(&self, meter_id: MeterId) -> Result<Option<EventRecord>, StorageError>;

    /// 每个电表各自的最新读数，按 meter_id 升序
    async fn latest_events(&self) -> Result<Vec<EventRecord>, StorageError>;

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventRecord>, StorageError>;
}

/// 告警规则存储接口
#[async_trait]
pub trait AlertRuleStore: Send + Sync {
    /// 按 alert_id 升序列出全部规则
    async fn list_rules(&self) -> Result<Vec<AlertRuleRecord>, StorageError>;

    async fn list_active_rules(&self) -> Result<Vec<AlertRuleRecord>, StorageError>;

    async fn find_rule(&self, alert_id: i64) -> Result<Option<AlertRuleRecord>, StorageError>;

    async fn create_rule(&self, rule: NewAlertRule) -> Result<AlertRuleRecord, StorageError>;

    /// 部分更新规则
    ///
    /// 电表、参数、阈值或消息发生变化时，先以 `changed_at_ms` 关闭该规则未结束的触发，
    /// 与更新原子完成，之后的评估按新规则重新打开。
    async fn update_rule(
        &self,
        alert_id: i64,
        update: AlertRuleUpdate,
        changed_at_ms: i64,
    ) -> Result<Option<AlertRuleRecord>, StorageError>;

    /// 关闭该规则所有未结束的触发，再删除规则，二者原子完成
    async fn delete_rule(&self, alert_id: i64, closed_at_ms: i64) -> Result<bool, StorageError>;
}

/// 已触发告警存储接口
#[async_trait]
pub trait TriggeredAlertStore: Send + Sync {
    /// 条件插入一条未结束的触发
    ///
    /// 规则不存在、已停用或已有未结束触发时返回 `None`，不写入。
    async fn open_trigger(
        &self,
        alert_id: i64,
        started_at_ms: i64,
    ) -> Result<Option<TriggeredAlertRecord>, StorageError>;

    /// 关闭该规则所有未结束的触发，返回关闭条数
    async fn close_triggers(&self, alert_id: i64, ended_at_ms: i64) -> Result<u64, StorageError>;

    /// 未结束的触发，按开始时间倒序
    async fn list_active_triggers(&self) -> Result<Vec<TriggeredAlertRecord>, StorageError>;

    /// 某规则的全部触发历史，按开始时间倒序
    async fn list_triggers_for_rule(
        &self,
        alert_id: i64,
    ) -> Result<Vec<TriggeredAlertRecord>, StorageError>;
}
