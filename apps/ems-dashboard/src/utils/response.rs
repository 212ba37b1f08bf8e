//! HTTP 响应辅助函数和 DTO 转换
//!
//! 提供统一的错误响应构造函数和 DTO 转换函数：
//! - 错误响应：bad_request_error, not_found_error, storage_error, alert_error, internal_error
//! - DTO 转换：meter_to_dto, event_to_dto, alert_rule_to_dto, triggered_alert_to_dto
//!
//! HTTP 状态码与错误码对应：400 `INVALID.REQUEST`，404 `RESOURCE.NOT_FOUND`，
//! 500 `INTERNAL.ERROR`。

use api_contract::{AlertRuleDto, ApiResponse, EventDto, MeterDto, TriggeredAlertDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ems_alerting::AlertError;
use ems_storage::{
    AlertRuleRecord, EventRecord, MeterRecord, StorageError, TriggeredAlertRecord,
};
use ems_transfer::format_timestamp_ms;
use tracing::error;

/// 错误请求响应
pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

/// 资源未找到错误响应
pub fn not_found_error() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error("RESOURCE.NOT_FOUND", "not found")),
    )
        .into_response()
}

/// 内部错误响应
pub fn internal_error(message: impl Into<String>) -> Response {
    let message = message.into();
    error!(target: "ems.http", error = %message, "request_failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", message)),
    )
        .into_response()
}

/// 存储错误响应
pub fn storage_error(err: StorageError) -> Response {
    internal_error(err.to_string())
}

/// 告警服务错误响应：校验失败 400，存储失败 500
pub fn alert_error(err: AlertError) -> Response {
    match err {
        AlertError::Invalid(message) => bad_request_error(message),
        AlertError::Storage(err) => storage_error(err),
    }
}

/// MeterRecord 转 MeterDto
pub fn meter_to_dto(record: MeterRecord) -> MeterDto {
    MeterDto {
        meter_id: record.meter_id,
        location: record.location,
        description: record.description,
        installed_at_ms: record.installed_at_ms,
        last_calibrated_at_ms: record.last_calibrated_at_ms,
    }
}

/// EventRecord 转 EventDto
pub fn event_to_dto(record: EventRecord) -> EventDto {
    let reading = record.reading;
    EventDto {
        event_id: record.event_id,
        meter_id: record.meter_id,
        ts_ms: record.ts_ms,
        timestamp: format_timestamp_ms(record.ts_ms),
        current_l1: reading.current_l1,
        current_l2: reading.current_l2,
        current_l3: reading.current_l3,
        voltage_l1: reading.voltage_l1,
        voltage_l2: reading.voltage_l2,
        voltage_l3: reading.voltage_l3,
        power_factor_l1: reading.power_factor_l1,
        power_factor_l2: reading.power_factor_l2,
        power_factor_l3: reading.power_factor_l3,
        avg_current: reading.avg_current,
        avg_voltage: reading.avg_voltage,
        avg_power_factor: reading.avg_power_factor,
        total_kw: reading.total_kw,
        total_kwh: reading.total_kwh,
    }
}

/// AlertRuleRecord 转 AlertRuleDto
pub fn alert_rule_to_dto(record: AlertRuleRecord) -> AlertRuleDto {
    AlertRuleDto {
        alert_id: record.alert_id,
        meter_id: record.meter_id,
        parameter: record.parameter.as_str().to_string(),
        threshold: record.threshold,
        message: record.message,
        is_active: record.is_active,
    }
}

/// TriggeredAlertRecord 转 TriggeredAlertDto
pub fn triggered_alert_to_dto(record: TriggeredAlertRecord) -> TriggeredAlertDto {
    TriggeredAlertDto {
        triggered_id: record.triggered_id,
        alert_id: record.alert_id,
        meter_id: record.meter_id,
        start_ms: record.start_ms,
        end_ms: record.end_ms,
        message: record.message,
        is_active: record.is_active,
    }
}
