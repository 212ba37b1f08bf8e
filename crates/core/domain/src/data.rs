use crate::field::EventField;

/// 一次电表读数的数值部分。
///
/// 所有字段可空：手工录入或导入时缺失的列保持为 `None`，
/// 告警评估将 `None` 视为“无值”，条件永不成立。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeterReading {
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

impl MeterReading {
    /// 按字段读取数值。
    pub fn value(&self, field: EventField) -> Option<f64> {
        match field {
            EventField::CurrentL1 => self.current_l1,
            EventField::CurrentL2 => self.current_l2,
            EventField::CurrentL3 => self.current_l3,
            EventField::VoltageL1 => self.voltage_l1,
            EventField::VoltageL2 => self.voltage_l2,
            EventField::VoltageL3 => self.voltage_l3,
            EventField::PowerFactorL1 => self.power_factor_l1,
            EventField::PowerFactorL2 => self.power_factor_l2,
            EventField::PowerFactorL3 => self.power_factor_l3,
            EventField::AvgCurrent => self.avg_current,
            EventField::AvgVoltage => self.avg_voltage,
            EventField::AvgPowerFactor => self.avg_power_factor,
            EventField::TotalKw => self.total_kw,
            EventField::TotalKwh => self.total_kwh,
        }
    }

    /// 按字段写入数值。
    pub fn set(&mut self, field: EventField, value: Option<f64>) {
        let slot = match field {
            EventField::CurrentL1 => &mut self.current_l1,
            EventField::CurrentL2 => &mut self.current_l2,
            EventField::CurrentL3 => &mut self.current_l3,
            EventField::VoltageL1 => &mut self.voltage_l1,
            EventField::VoltageL2 => &mut self.voltage_l2,
            EventField::VoltageL3 => &mut self.voltage_l3,
            EventField::PowerFactorL1 => &mut self.power_factor_l1,
            EventField::PowerFactorL2 => &mut self.power_factor_l2,
            EventField::PowerFactorL3 => &mut self.power_factor_l3,
            EventField::AvgCurrent => &mut self.avg_current,
            EventField::AvgVoltage => &mut self.avg_voltage,
            EventField::AvgPowerFactor => &mut self.avg_power_factor,
            EventField::TotalKw => &mut self.total_kw,
            EventField::TotalKwh => &mut self.total_kwh,
        };
        *slot = value;
    }
}
