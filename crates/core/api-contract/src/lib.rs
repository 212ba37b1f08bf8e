//! 稳定的 DTO 与 API 响应契约。
//!
//! 请求体同时接受 camelCase 与仪表盘表单沿用的列名写法（`MeterID`、`AvgCurrent`、`Total_KWH`）。

use serde::{Deserialize, Serialize};

/// 标准 API 响应封装。
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// 失败响应的错误体。
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }
}

/// 电表返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterDto {
    pub meter_id: i64,
    pub location: String,
    pub description: Option<String>,
    pub installed_at_ms: Option<i64>,
    pub last_calibrated_at_ms: Option<i64>,
}

/// 读数返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub event_id: i64,
    pub meter_id: i64,
    pub ts_ms: i64,
    /// UTC，`YYYY-MM-DD HH:MM:SS[.mmm]`
    pub timestamp: String,
    pub current_l1: Option<f64>,
    pub current_l2: Option<f64>,
    pub current_l3: Option<f64>,
    pub voltage_l1: Option<f64>,
    pub voltage_l2: Option<f64>,
    pub voltage_l3: Option<f64>,
    pub power_factor_l1: Option<f64>,
    pub power_factor_l2: Option<f64>,
    pub power_factor_l3: Option<f64>,
    pub avg_current: Option<f64>,
    pub avg_voltage: Option<f64>,
    pub avg_power_factor: Option<f64>,
    pub total_kw: Option<f64>,
    pub total_kwh: Option<f64>,
}

/// 手工录入读数请求体。
///
/// `timestamp` 与 `tsMs` 都缺省时使用服务器当前时间。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(alias = "MeterID")]
    pub meter_id: i64,
    #[serde(alias = "Timestamp")]
    pub timestamp: Option<String>,
    pub ts_ms: Option<i64>,
    #[serde(alias = "Current_L1")]
    pub current_l1: Option<f64>,
    #[serde(alias = "Current_L2")]
    pub current_l2: Option<f64>,
    #[serde(alias = "Current_L3")]
    pub current_l3: Option<f64>,
    #[serde(alias = "Voltage_L1")]
    pub voltage_l1: Option<f64>,
    #[serde(alias = "Voltage_L2")]
    pub voltage_l2: Option<f64>,
    #[serde(alias = "Voltage_L3")]
    pub voltage_l3: Option<f64>,
    #[serde(alias = "PowerFactor_L1")]
    pub power_factor_l1: Option<f64>,
    #[serde(alias = "PowerFactor_L2")]
    pub power_factor_l2: Option<f64>,
    #[serde(alias = "PowerFactor_L3")]
    pub power_factor_l3: Option<f64>,
    #[serde(alias = "AvgCurrent")]
    pub avg_current: Option<f64>,
    #[serde(alias = "AvgVoltage")]
    pub avg_voltage: Option<f64>,
    #[serde(alias = "AvgPowerFactor")]
    pub avg_power_factor: Option<f64>,
    #[serde(alias = "Total_KW")]
    pub total_kw: Option<f64>,
    #[serde(alias = "Total_KWH")]
    pub total_kwh: Option<f64>,
}

/// 手工录入读数响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventResponse {
    pub message: String,
    pub event_id: i64,
}

/// “全部刷新”响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAllResponse {
    pub appended: usize,
}

/// 表格导入响应体。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEventsResponse {
    pub imported: usize,
}

/// 读数列表查询参数。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    pub meter_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// 单表历史查询参数。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// 各表最新累计电量。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalKwhDto {
    pub meter_id: i64,
    pub location: String,
    pub total_kwh: Option<f64>,
    pub ts_ms: i64,
}

/// 告警规则返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRuleDto {
    pub alert_id: i64,
    pub meter_id: i64,
    pub parameter: String,
    pub threshold: f64,
    pub message: String,
    pub is_active: bool,
}

/// 告警规则创建请求体。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRuleRequest {
    #[serde(alias = "MeterID")]
    pub meter_id: i64,
    #[serde(alias = "Parameter")]
    pub parameter: String,
    #[serde(alias = "Threshold")]
    pub threshold: f64,
    #[serde(alias = "Message")]
    pub message: String,
    #[serde(alias = "IsActive")]
    pub is_active: Option<bool>,
}

/// 告警规则更新请求体（字段均可选）。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRuleRequest {
    #[serde(alias = "MeterID")]
    pub meter_id: Option<i64>,
    #[serde(alias = "Parameter")]
    pub parameter: Option<String>,
    #[serde(alias = "Threshold")]
    pub threshold: Option<f64>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
    #[serde(alias = "IsActive")]
    pub is_active: Option<bool>,
}

/// 已触发告警返回结构。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggeredAlertDto {
    pub triggered_id: i64,
    pub alert_id: i64,
    pub meter_id: i64,
    pub start_ms: i64,
    pub end_ms: Option<i64>,
    pub message: String,
    pub is_active: bool,
}

/// 计数指标快照。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshotDto {
    pub alert_evaluations: u64,
    pub alert_evaluation_failures: u64,
    pub triggers_opened: u64,
    pub triggers_closed: u64,
    pub poll_ticks: u64,
    pub events_appended: u64,
    pub events_imported: u64,
}
