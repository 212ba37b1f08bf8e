//! 输入验证辅助函数
//!
//! - resolve_range：解析 `startDate`/`endDate`，缺省的一端各自补齐
//! - parse_parameter：告警参数名必须是读数字段之一
//! - json_body：请求体反序列化失败时返回统一信封
//!
//! 失败返回 bad_request_error 响应。

use crate::utils::response::bad_request_error;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use domain::EventField;
use ems_transfer::parse_timestamp_ms;

const HOUR_MS: i64 = 3_600_000;

/// 时间范围（毫秒，闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from_ms: i64,
    pub to_ms: i64,
}

/// 缺少 `startDate` 时取 `now - default_hours`，缺少 `endDate` 时取 `now`。
/// 只有日期的写法按当日零点（UTC）解释。
pub fn resolve_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
    now_ms: i64,
    default_hours: u64,
) -> Result<TimeRange, Response> {
    let lookback_ms = i64::try_from(default_hours)
        .unwrap_or(i64::MAX)
        .saturating_mul(HOUR_MS);
    let from_ms = match non_blank(start_date) {
        Some(value) => parse_date(value, "startDate")?,
        None => now_ms.saturating_sub(lookback_ms),
    };
    let to_ms = match non_blank(end_date) {
        Some(value) => parse_date(value, "endDate")?,
        None => now_ms,
    };
    if from_ms > to_ms {
        return Err(bad_request_error("startDate must be <= endDate"));
    }
    Ok(TimeRange { from_ms, to_ms })
}

/// 解析告警参数名（大小写与下划线不敏感）
pub fn parse_parameter(value: &str) -> Result<EventField, Response> {
    value
        .parse::<EventField>()
        .map_err(|err| bad_request_error(err.to_string()))
}

/// 解包 JSON 请求体，反序列化失败按 400 INVALID.REQUEST 返回
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(bad_request_error(rejection.body_text())),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_date(value: &str, field: &str) -> Result<i64, Response> {
    parse_timestamp_ms(value).map_err(|_| bad_request_error(format!("invalid {field}: {value}")))
}
