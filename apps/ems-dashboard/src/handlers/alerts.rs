//! 告警 handlers
//!
//! 提供告警规则的增删改查与触发查询：
//! - GET /api/alerts/parameters - 可用的参数名
//! - GET /api/alerts/rules - 列出规则
//! - POST /api/alerts/rules - 创建规则并立即评估
//! - PUT /api/alerts/rules/{id} - 部分更新并立即评估
//! - DELETE /api/alerts/rules/{id} - 关闭未结束触发后删除
//! - GET /api/alerts/rules/{id}/history - 触发历史
//! - GET /api/alerts/triggered - 未结束的触发

use crate::AppState;
use crate::utils::response::{alert_error, not_found_error};
use crate::utils::{alert_rule_to_dto, json_body, parse_parameter, triggered_alert_to_dto};
use api_contract::{
    AlertRuleDto, ApiResponse, CreateAlertRuleRequest, TriggeredAlertDto, UpdateAlertRuleRequest,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::EventField;
use ems_storage::{AlertRuleUpdate, NewAlertRule};

#[derive(serde::Deserialize)]
pub struct AlertPath {
    alert_id: i64,
}

/// 可用的参数名（与读数列名一致）
pub async fn list_alert_parameters() -> Response {
    let data: Vec<&'static str> = EventField::ALL.iter().map(|field| field.as_str()).collect();
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// 列出规则
pub async fn list_alert_rules(State(state): State<AppState>) -> Response {
    match state.alerts.list_rules().await {
        Ok(rules) => {
            let data: Vec<AlertRuleDto> = rules.into_iter().map(alert_rule_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => alert_error(err),
    }
}

/// 创建规则
pub async fn create_alert_rule(
    State(state): State<AppState>,
    body: Result<Json<CreateAlertRuleRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let parameter = match parse_parameter(&req.parameter) {
        Ok(parameter) => parameter,
        Err(response) => return response,
    };
    let rule = NewAlertRule {
        meter_id: req.meter_id,
        parameter,
        threshold: req.threshold,
        message: req.message,
        is_active: req.is_active.unwrap_or(true),
    };
    match state.alerts.create_rule(rule).await {
        Ok(rule) => (
            StatusCode::OK,
            Json(ApiResponse::success(alert_rule_to_dto(rule))),
        )
            .into_response(),
        Err(err) => alert_error(err),
    }
}

/// 更新规则
pub async fn update_alert_rule(
    State(state): State<AppState>,
    Path(path): Path<AlertPath>,
    body: Result<Json<UpdateAlertRuleRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let parameter = match req.parameter.as_deref().map(parse_parameter).transpose() {
        Ok(parameter) => parameter,
        Err(response) => return response,
    };
    let update = AlertRuleUpdate {
        meter_id: req.meter_id,
        parameter,
        threshold: req.threshold,
        message: req.message,
        is_active: req.is_active,
    };
    match state.alerts.update_rule(path.alert_id, update).await {
        Ok(Some(rule)) => (
            StatusCode::OK,
            Json(ApiResponse::success(alert_rule_to_dto(rule))),
        )
            .into_response(),
        Ok(None) => not_found_error(),
        Err(err) => alert_error(err),
    }
}

/// 删除规则
pub async fn delete_alert_rule(
    State(state): State<AppState>,
    Path(path): Path<AlertPath>,
) -> Response {
    match state.alerts.delete_rule(path.alert_id).await {
        Ok(true) => (StatusCode::OK, Json(ApiResponse::success(()))).into_response(),
        Ok(false) => not_found_error(),
        Err(err) => alert_error(err),
    }
}

/// 规则触发历史（规则删除后仍可查询）
pub async fn get_alert_rule_history(
    State(state): State<AppState>,
    Path(path): Path<AlertPath>,
) -> Response {
    match state.alerts.list_rule_history(path.alert_id).await {
        Ok(history) => {
            let data: Vec<TriggeredAlertDto> =
                history.into_iter().map(triggered_alert_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => alert_error(err),
    }
}

/// 未结束的触发，按开始时间倒序
pub async fn list_triggered_alerts(State(state): State<AppState>) -> Response {
    match state.alerts.list_active_triggers().await {
        Ok(triggers) => {
            let data: Vec<TriggeredAlertDto> =
                triggers.into_iter().map(triggered_alert_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => alert_error(err),
    }
}
