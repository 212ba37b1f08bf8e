//! 时间字符串与 UTC 毫秒时间戳互转。
//!
//! 不带时区的写法一律按 UTC 解释。

use crate::error::TransferError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// 导出与展示使用的格式。毫秒不为零时追加小数部分。
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// 解析 RFC 3339、`YYYY-MM-DD HH:MM[:SS]`、`YYYY-MM-DDTHH:MM[:SS]` 或 `YYYY-MM-DD`。
pub fn parse_timestamp_ms(value: &str) -> Result<i64, TransferError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.timestamp_millis());
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(parsed.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| TransferError::Timestamp(value.to_string()))
}

/// 格式化为 `YYYY-MM-DD HH:MM:SS[.mmm]`（UTC）。超出范围时退化为毫秒数字。
pub fn format_timestamp_ms(ts_ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ts_ms) {
        Some(datetime) => datetime.format(DISPLAY_FORMAT).to_string(),
        None => ts_ms.to_string(),
    }
}
