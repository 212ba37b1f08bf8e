//! 读数表格导入导出 handlers
//!
//! - POST /api/events/import - 请求体为 CSV 文本，任一行出错整份拒收
//! - GET /api/events/export - 按时间升序导出 CSV

use crate::AppState;
use crate::utils::response::{bad_request_error, internal_error, storage_error};
use crate::utils::resolve_range;
use api_contract::{ApiResponse, EventsQuery, ImportEventsResponse};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use ems_storage::{EventQuery, TimeOrder};
use ems_telemetry::record_events_imported;
use ems_transfer::{parse_events_csv, write_events_csv};
use std::collections::BTreeSet;
use tracing::info;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const EXPORT_FILE_NAME: &str = "events.csv";

/// 导入读数表格
pub async fn import_events(State(state): State<AppState>, body: String) -> Response {
    let events = match parse_events_csv(body.as_bytes()) {
        Ok(events) => events,
        Err(err) => return bad_request_error(err.to_string()),
    };
    let meter_ids: BTreeSet<i64> = events.iter().map(|event| event.meter_id).collect();
    for meter_id in meter_ids {
        match state.meters.find_meter(meter_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return bad_request_error(format!("unknown meter: {meter_id}")),
            Err(err) => return storage_error(err),
        }
    }
    match state.events.append_events(&events).await {
        Ok(imported) => {
            record_events_imported(imported as u64);
            info!(target: "ems.http", imported, "events_imported");
            (
                StatusCode::OK,
                Json(ApiResponse::success(ImportEventsResponse { imported })),
            )
                .into_response()
        }
        Err(err) => storage_error(err),
    }
}

/// 导出读数表格
pub async fn export_events(
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
    let events = match state
        .events
        .query_events(EventQuery {
            meter_id: query.meter_id,
            from_ms: Some(range.from_ms),
            to_ms: Some(range.to_ms),
            order: TimeOrder::Asc,
        })
        .await
    {
        Ok(events) => events,
        Err(err) => return storage_error(err),
    };

    let mut body = Vec::new();
    if let Err(err) = write_events_csv(&mut body, &events) {
        return internal_error(err.to_string());
    }
    info!(target: "ems.http", exported = events.len(), "events_exported");
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response()
}
