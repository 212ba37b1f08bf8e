//! 默认种子数据
//!
//! 15 块商铺总表（101..=115）与两条示例告警规则。

use crate::models::{MeterRecord, NewAlertRule};
use domain::EventField;

// 2025-09-01 15:44:00 UTC 起的安装时间
const INSTALLED_AT_MS: [i64; 15] = [
    1_756_741_440_000,
    1_756_741_440_000,
    1_756_741_479_000,
    1_756_741_500_000,
    1_756_741_520_000,
    1_756_741_530_000,
    1_756_741_540_000,
    1_756_741_550_000,
    1_756_741_560_000,
    1_756_741_570_000,
    1_756_741_580_000,
    1_756_741_590_000,
    1_756_741_600_000,
    1_756_741_610_000,
    1_756_741_610_000,
];

pub fn default_meters() -> Vec<MeterRecord> {
    INSTALLED_AT_MS
        .iter()
        .enumerate()
        .map(|(index, installed_at_ms)| {
            let shop = index + 1;
            MeterRecord {
                meter_id: 100 + shop as i64,
                location: format!("Shop-{shop}"),
                description: Some(format!("Main Meter for Shop {shop}")),
                installed_at_ms: Some(*installed_at_ms),
                last_calibrated_at_ms: None,
            }
        })
        .collect()
}

pub fn default_alert_rules() -> Vec<NewAlertRule> {
    vec![
        NewAlertRule {
            meter_id: 101,
            parameter: EventField::AvgCurrent,
            threshold: 26.0,
            message: "Shop 1 meter high current".to_string(),
            is_active: true,
        },
        NewAlertRule {
            meter_id: 102,
            parameter: EventField::AvgVoltage,
            threshold: 232.0,
            message: "Shop 2 meter high voltage".to_string(),
            is_active: true,
        },
    ]
}
