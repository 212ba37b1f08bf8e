//! PostgreSQL 存储实现模块
//!
//! 表结构见 [`crate::schema`]。时间列为 `timestamptz`，
//! 读写时与毫秒时间戳互转：`to_timestamp($n / 1000.0)` / `extract(epoch from ts) * 1000`。
//!
//! - MeterStore: PgMeterStore
//! - EventStore: PgEventStore
//! - AlertRuleStore + TriggeredAlertStore: PgAlertStore

pub mod alert;
pub mod event;
pub mod meter;

pub use alert::*;
pub use event::*;
pub use meter::*;
