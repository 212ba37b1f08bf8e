//! 领域模型：所有模块共享的电表读数词汇。
//!
//! - [`EventField`]：读数中可被告警规则引用的数值字段（白名单）
//! - [`MeterReading`]：一次读数的全部数值（三相电流/电压/功率因数、平均值、功率、电量）

pub mod data;
pub mod field;

pub use data::MeterReading;
pub use field::{EventField, ParseEventFieldError};

/// 电表编号（业务主键，如 101）。
pub type MeterId = i64;
