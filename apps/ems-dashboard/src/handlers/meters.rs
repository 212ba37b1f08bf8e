//! 电表与图表数据 handlers
//!
//! - GET /api/meters - 列出电表
//! - GET /api/live-data/{meter_id} - 最新读数，无读数时为 null
//! - GET /api/historical-data/{meter_id} - 时间范围内读数，按时间升序
//! - GET /api/total-kwh-latest - 各表最新累计电量

use crate::AppState;
use crate::utils::response::storage_error;
use crate::utils::{event_to_dto, meter_to_dto, resolve_range};
use api_contract::{ApiResponse, EventDto, HistoryQuery, MeterDto, TotalKwhDto};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ems_storage::{EventQuery, TimeOrder};
use std::collections::HashMap;

#[derive(serde::Deserialize)]
pub struct MeterPath {
    pub(crate) meter_id: i64,
}

/// 列出电表
pub async fn list_meters(State(state): State<AppState>) -> Response {
    match state.meters.list_meters().await {
        Ok(meters) => {
            let data: Vec<MeterDto> = meters.into_iter().map(meter_to_dto).collect();
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 最新读数
pub async fn get_live_data(
    State(state): State<AppState>,
    Path(path): Path<MeterPath>,
) -> Response {
    match state.events.latest_event(path.meter_id).await {
        Ok(latest) => {
            let data: Option<EventDto> = latest.map(event_to_dto);
            (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 历史读数
pub async fn get_historical_data(
    State(state): State<AppState>,
    Path(path): Path<MeterPath>,
    Query(query): Query<HistoryQuery>,
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
            meter_id: Some(path.meter_id),
            from_ms: Some(range.from_ms),
            to_ms: Some(range.to_ms),
            order: TimeOrder::Asc,
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

/// 各表最新累计电量（仅含有读数的电表），按 meter_id 升序
pub async fn get_total_kwh_latest(State(state): State<AppState>) -> Response {
    let meters = match state.meters.list_meters().await {
        Ok(meters) => meters,
        Err(err) => return storage_error(err),
    };
    let latest = match state.events.latest_events().await {
        Ok(latest) => latest,
        Err(err) => return storage_error(err),
    };
    let locations: HashMap<i64, String> = meters
        .into_iter()
        .map(|meter| (meter.meter_id, meter.location))
        .collect();
    let data: Vec<TotalKwhDto> = latest
        .into_iter()
        .filter_map(|event| {
            let location = locations.get(&event.meter_id)?.clone();
            Some(TotalKwhDto {
                meter_id: event.meter_id,
                location,
                total_kwh: event.reading.total_kwh,
                ts_ms: event.ts_ms,
            })
        })
        .collect();
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}
