use api_contract::{
    AlertRuleDto, CreateAlertRuleRequest, CreateEventRequest, EventsQuery, TriggeredAlertDto,
    UpdateAlertRuleRequest,
};
use serde_json::Value;

#[test]
fn alert_rule_dto_is_camel_case() {
    let dto = AlertRuleDto {
        alert_id: 1,
        meter_id: 101,
        parameter: "AvgCurrent".to_string(),
        threshold: 26.0,
        message: "High current".to_string(),
        is_active: true,
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert_eq!(value.get("alertId"), Some(&Value::from(1)));
    assert_eq!(value.get("meterId"), Some(&Value::from(101)));
    assert_eq!(value.get("isActive"), Some(&Value::Bool(true)));
    assert!(value.get("alert_id").is_none());
}

#[test]
fn create_rule_accepts_camel_case() {
    let payload = r#"{"meterId":101,"parameter":"AvgCurrent","threshold":26,"message":"High"}"#;
    let req: CreateAlertRuleRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.meter_id, 101);
    assert_eq!(req.parameter, "AvgCurrent");
    assert_eq!(req.threshold, 26.0);
    assert!(req.is_active.is_none());
}

#[test]
fn create_rule_accepts_column_names() {
    let payload =
        r#"{"MeterID":102,"Parameter":"Total_KW","Threshold":1.5,"Message":"Load","IsActive":false}"#;
    let req: CreateAlertRuleRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.meter_id, 102);
    assert_eq!(req.parameter, "Total_KW");
    assert_eq!(req.is_active, Some(false));
}

#[test]
fn create_rule_rejects_non_numeric_threshold() {
    let payload = r#"{"meterId":101,"parameter":"AvgCurrent","threshold":"high","message":"m"}"#;
    assert!(serde_json::from_str::<CreateAlertRuleRequest>(payload).is_err());
}

#[test]
fn update_rule_fields_are_optional() {
    let req: UpdateAlertRuleRequest = serde_json::from_str(r#"{"isActive":false}"#).expect("parse");
    assert_eq!(req.is_active, Some(false));
    assert!(req.meter_id.is_none());
    assert!(req.parameter.is_none());
    assert!(req.threshold.is_none());
    assert!(req.message.is_none());
}

#[test]
fn create_event_accepts_column_names() {
    let payload = r#"{"MeterID":101,"Timestamp":"2025-10-01 12:00:00","AvgCurrent":25.5,"Total_KWH":120.0}"#;
    let req: CreateEventRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.meter_id, 101);
    assert_eq!(req.timestamp.as_deref(), Some("2025-10-01 12:00:00"));
    assert_eq!(req.avg_current, Some(25.5));
    assert_eq!(req.total_kwh, Some(120.0));
    assert!(req.voltage_l1.is_none());
}

#[test]
fn create_event_accepts_null_readings() {
    let payload = r#"{"meterId":101,"tsMs":1700000000000,"avgCurrent":null}"#;
    let req: CreateEventRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.ts_ms, Some(1_700_000_000_000));
    assert!(req.avg_current.is_none());
}

#[test]
fn events_query_is_camel_case() {
    let query: EventsQuery =
        serde_json::from_str(r#"{"meterId":103,"startDate":"2025-10-01"}"#).expect("parse");
    assert_eq!(query.meter_id, Some(103));
    assert_eq!(query.start_date.as_deref(), Some("2025-10-01"));
    assert!(query.end_date.is_none());
}

#[test]
fn triggered_alert_end_is_null_while_open() {
    let dto = TriggeredAlertDto {
        triggered_id: 7,
        alert_id: 1,
        meter_id: 101,
        start_ms: 1_700_000_000_000,
        end_ms: None,
        message: "High current".to_string(),
        is_active: true,
    };
    let value = serde_json::to_value(dto).expect("serialize");
    assert_eq!(value.get("endMs"), Some(&Value::Null));
    assert!(matches!(value.get("startMs"), Some(Value::Number(_))));
}
