//! 读数 handlers
//!
//! - GET /api/events - 时间范围内读数，可按电表过滤，按时间倒序
//! - POST /api/events（/api/add-event）- 手工录入一条读数
//! - POST /api/events/refresh-all - 为每个有读数的电表复制最新读数，时间取当前
//!
//! 录入读数不会立即评估告警，由轮询器在下一轮处理。

use crate::AppState;
use crate::utils::response::{bad_request_error, storage_error};
use crate::utils::{event_to_dto, json_body, resolve_range};
use api_contract::{
    ApiResponse, CreateEventRequest, CreateEventResponse, EventDto, EventsQuery,
    RefreshAllResponse,
};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use domain::MeterReading;
use ems_storage::{EventQuery, NewEvent, TimeOrder};
use ems_telemetry::record_events_appended;
use ems_transfer::parse_timestamp_ms;
use tracing::info;

/// 读数列表
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Response {
    let range = match resolve_range(
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        state.clock.now_ms(),
        state.history_default_hours,
    ) {
        Ok(range) => range,
        Err(response) => return response,
    };
    match state
        .events
        .query_events(EventQuery {
            meter_id: query.meter_id,
            from_ms: Some(range.from_ms),
            to_ms: Some(range.to_ms),
            order: TimeOrder::Desc,
        })
        .await
    {
        Ok(events) => {
            let data: Vec<EventDto> = events.into_iter().map(event_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 手工录入读数
pub async fn create_event(
    State(state): State<AppState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(body) {
        Ok(req) => req,
        Err(response) => return response,
    };
    let ts_ms = match (req.ts_ms, req.timestamp.as_deref().map(str::trim)) {
        (Some(ts_ms), _) => ts_ms,
        (None, Some(timestamp)) if !timestamp.is_empty() => match parse_timestamp_ms(timestamp) {
            Ok(ts_ms) => ts_ms,
            Err(err) => return bad_request_error(err.to_string()),
        },
        (None, _) => state.clock.now_ms(),
    };
    let reading = reading_from_request(&req);
    match state.meters.find_meter(req.meter_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return bad_request_error(format!("unknown meter: {}", req.meter_id)),
        Err(err) => return storage_error(err),
    }

    match state
        .events
        .append_event(NewEvent {
            meter_id: req.meter_id,
            ts_ms,
            reading,
        })
        .await
    {
        Ok(event) => {
            record_events_appended(1);
            info!(
                target: "ems.http",
                event_id = event.event_id,
                meter_id = event.meter_id,
                ts_ms = event.ts_ms,
                "event_created"
            );
            (
                StatusCode::OK,
                Json(ApiResponse::success(CreateEventResponse {
                    message: "Event added successfully".to_string(),
                    event_id: event.event_id,
                })),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 全部刷新：没有任何读数的电表跳过
pub async fn refresh_all_events(State(state): State<AppState>) -> Response {
    let latest = match state.events.latest_events().await {
        Ok(latest) => latest,
        Err(err) => return storage_error(err),
    };
    let now_ms = state.clock.now_ms();
    let copies: Vec<NewEvent> = latest
        .into_iter()
        .map(|event| NewEvent {
            meter_id: event.meter_id,
            ts_ms: now_ms,
            reading: event.reading,
        })
        .collect();
    match state.events.append_events(&copies).await {
        Ok(appended) => {
            record_events_appended(appended as u64);
            info!(target: "ems.http", appended, "events_refreshed");
            (
                StatusCode::OK,
                Json(ApiResponse::success(RefreshAllResponse { appended })),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

fn reading_from_request(req: &CreateEventRequest) -> MeterReading {
    MeterReading {
        current_l1: req.current_l1,
        current_l2: req.current_l2,
        current_l3: req.current_l3,
        voltage_l1: req.voltage_l1,
        voltage_l2: req.voltage_l2,
        voltage_l3: req.voltage_l3,
        power_factor_l1: req.power_factor_l1,
        power_factor_l2: req.power_factor_l2,
        power_factor_l3: req.power_factor_l3,
        avg_current: req.avg_current,
        avg_voltage: req.avg_voltage,
        avg_power_factor: req.avg_power_factor,
        total_kw: req.total_kw,
        total_kwh: req.total_kwh,
    }
}
