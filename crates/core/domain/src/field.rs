//! 读数字段白名单。
//!
//! 告警规则的 `parameter` 只能引用这里列出的数值字段。
//! 对外名称沿用读数表的列名（`AvgCurrent`、`Total_KWH` 等），
//! 解析时大小写不敏感，并接受 snake_case 写法（`avg_current`）。

use std::fmt;
use std::str::FromStr;

/// 读数数值字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    CurrentL1,
    CurrentL2,
    CurrentL3,
    VoltageL1,
    VoltageL2,
    VoltageL3,
    PowerFactorL1,
    PowerFactorL2,
    PowerFactorL3,
    AvgCurrent,
    AvgVoltage,
    AvgPowerFactor,
    TotalKw,
    TotalKwh,
}

impl EventField {
    /// 全部字段，按表格列顺序排列。
    pub const ALL: [EventField; 14] = [
        EventField::CurrentL1,
        EventField::CurrentL2,
        EventField::CurrentL3,
        EventField::VoltageL1,
        EventField::VoltageL2,
        EventField::VoltageL3,
        EventField::PowerFactorL1,
        EventField::PowerFactorL2,
        EventField::PowerFactorL3,
        EventField::AvgCurrent,
        EventField::AvgVoltage,
        EventField::AvgPowerFactor,
        EventField::TotalKw,
        EventField::TotalKwh,
    ];

    /// 对外名称（与表格列名一致）。
    pub fn as_str(&self) -> &'static str {
        match self {
            EventField::CurrentL1 => "Current_L1",
            EventField::CurrentL2 => "Current_L2",
            EventField::CurrentL3 => "Current_L3",
            EventField::VoltageL1 => "Voltage_L1",
            EventField::VoltageL2 => "Voltage_L2",
            EventField::VoltageL3 => "Voltage_L3",
            EventField::PowerFactorL1 => "PowerFactor_L1",
            EventField::PowerFactorL2 => "PowerFactor_L2",
            EventField::PowerFactorL3 => "PowerFactor_L3",
            EventField::AvgCurrent => "AvgCurrent",
            EventField::AvgVoltage => "AvgVoltage",
            EventField::AvgPowerFactor => "AvgPowerFactor",
            EventField::TotalKw => "Total_KW",
            EventField::TotalKwh => "Total_KWH",
        }
    }

    /// 数据库列名。
    pub fn column(&self) -> &'static str {
        match self {
            EventField::CurrentL1 => "current_l1",
            EventField::CurrentL2 => "current_l2",
            EventField::CurrentL3 => "current_l3",
            EventField::VoltageL1 => "voltage_l1",
            EventField::VoltageL2 => "voltage_l2",
            EventField::VoltageL3 => "voltage_l3",
            EventField::PowerFactorL1 => "power_factor_l1",
            EventField::PowerFactorL2 => "power_factor_l2",
            EventField::PowerFactorL3 => "power_factor_l3",
            EventField::AvgCurrent => "avg_current",
            EventField::AvgVoltage => "avg_voltage",
            EventField::AvgPowerFactor => "avg_power_factor",
            EventField::TotalKw => "total_kw",
            EventField::TotalKwh => "total_kwh",
        }
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知字段名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventFieldError(pub String);

impl fmt::Display for ParseEventFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown event field: {}", self.0)
    }
}

impl std::error::Error for ParseEventFieldError {}

impl FromStr for EventField {
    type Err = ParseEventFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = fold(value);
        if wanted.is_empty() {
            return Err(ParseEventFieldError(value.to_string()));
        }
        EventField::ALL
            .iter()
            .copied()
            .find(|field| fold(field.as_str()) == wanted)
            .ok_or_else(|| ParseEventFieldError(value.to_string()))
    }
}

// "Total_KWH" / "total_kwh" / "TotalKwh" 归一为 "totalkwh"
fn fold(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c != '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
