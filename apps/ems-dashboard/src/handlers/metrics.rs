//! Telemetry 指标快照。
//!
//! - GET /metrics

use api_contract::{ApiResponse, MetricsSnapshotDto};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ems_telemetry::metrics;

pub async fn get_metrics() -> Response {
    let snapshot = metrics().snapshot();
    (
        StatusCode::OK,
        Json(ApiResponse::success(MetricsSnapshotDto {
            alert_evaluations: snapshot.alert_evaluations,
            alert_evaluation_failures: snapshot.alert_evaluation_failures,
            triggers_opened: snapshot.triggers_opened,
            triggers_closed: snapshot.triggers_closed,
            poll_ticks: snapshot.poll_ticks,
            events_appended: snapshot.events_appended,
            events_imported: snapshot.events_imported,
        })),
    )
        .into_response()
}
