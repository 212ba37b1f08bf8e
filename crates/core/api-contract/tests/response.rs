use api_contract::{ApiResponse, MeterDto};
use serde_json::json;

#[test]
fn success_envelope_wraps_data() {
    let response = ApiResponse::success(vec![MeterDto {
        meter_id: 101,
        location: "Shop-1".to_string(),
        description: None,
        installed_at_ms: Some(1_756_741_440_000),
        last_calibrated_at_ms: None,
    }]);
    let value = serde_json::to_value(response).expect("serialize");
    assert_eq!(
        value,
        json!({
            "success": true,
            "data": [{
                "meterId": 101,
                "location": "Shop-1",
                "description": null,
                "installedAtMs": 1_756_741_440_000_i64,
                "lastCalibratedAtMs": null
            }],
            "error": null
        })
    );
}

#[test]
fn empty_success_serializes_null_data() {
    let value = serde_json::to_value(ApiResponse::success(())).expect("serialize");
    assert_eq!(value, json!({ "success": true, "data": null, "error": null }));
}

#[test]
fn error_envelopes_carry_code_and_message() {
    for (code, message) in [
        ("INVALID.REQUEST", "unknown event field: Temperature"),
        ("RESOURCE.NOT_FOUND", "not found"),
        ("INTERNAL.ERROR", "lock failed"),
    ] {
        let value =
            serde_json::to_value(ApiResponse::<()>::error(code, message)).expect("serialize");
        assert_eq!(
            value,
            json!({
                "success": false,
                "data": null,
                "error": { "code": code, "message": message }
            })
        );
    }
}
