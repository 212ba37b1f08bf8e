//! 内存存储实现模块
//!
//! 未配置 `EMS_DATABASE_URL` 时使用，同时作为测试夹具。
//!
//! - MeterStore: InMemoryMeterStore
//! - EventStore: InMemoryEventStore
//! - AlertRuleStore + TriggeredAlertStore: InMemoryAlertStore

pub mod alert;
pub mod event;
pub mod meter;

pub use alert::*;
pub use event::*;
pub use meter::*;
