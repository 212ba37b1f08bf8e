//! 读数表格（CSV）。
//!
//! 表头沿用读数表列名：`MeterID, Timestamp, Current_L1, …, Total_KWH`。
//! 导入按列名定位，`MeterID` 与 `Timestamp` 必填，读数列可缺省，空单元格为 null。
//! 任一行出错则整份表格拒收。导出在最前面多一列 `EventID`。

use crate::error::TransferError;
use crate::timestamp::{format_timestamp_ms, parse_timestamp_ms};
use domain::{EventField, MeterReading};
use ems_storage::{EventRecord, NewEvent};
use std::io;

pub const METER_ID_COLUMN: &str = "MeterID";
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
pub const EVENT_ID_COLUMN: &str = "EventID";

struct Columns {
    meter_id: usize,
    timestamp: usize,
    fields: Vec<(usize, EventField)>,
}

fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, TransferError> {
    let names: Vec<&str> = headers
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim())
        .collect();
    let find = |wanted: &str| {
        names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TransferError::MissingColumn(wanted.to_string()))
    };
    let meter_id = find(METER_ID_COLUMN)?;
    let timestamp = find(TIMESTAMP_COLUMN)?;
    let fields = names
        .iter()
        .enumerate()
        .filter_map(|(index, name)| name.parse::<EventField>().ok().map(|field| (index, field)))
        .collect();
    Ok(Columns {
        meter_id,
        timestamp,
        fields,
    })
}

fn parse_optional_f64(value: &str) -> Result<Option<f64>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(Some(parsed)),
        _ => Err(format!("invalid number '{value}'")),
    }
}

fn record_to_event(record: &csv::StringRecord, columns: &Columns) -> Result<NewEvent, String> {
    let cell = |index: usize| record.get(index).unwrap_or("").trim();

    let meter_id_text = cell(columns.meter_id);
    let meter_id = meter_id_text
        .parse::<i64>()
        .map_err(|_| format!("invalid {METER_ID_COLUMN} '{meter_id_text}'"))?;
    let ts_ms = parse_timestamp_ms(cell(columns.timestamp)).map_err(|err| err.to_string())?;

    let mut reading = MeterReading::default();
    for (index, field) in &columns.fields {
        let value = parse_optional_f64(cell(*index)).map_err(|err| format!("{field}: {err}"))?;
        reading.set(*field, value);
    }
    Ok(NewEvent {
        meter_id,
        ts_ms,
        reading,
    })
}

/// 解析整份读数表格。
pub fn parse_events_csv<R: io::Read>(reader: R) -> Result<Vec<NewEvent>, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let columns = locate_columns(&headers)?;

    let mut events = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or_default();
        let event =
            record_to_event(&record, &columns).map_err(|message| TransferError::Row { line, message })?;
        events.push(event);
    }
    Ok(events)
}

/// 导出表头。
pub fn export_headers() -> Vec<&'static str> {
    let mut headers = vec![EVENT_ID_COLUMN, METER_ID_COLUMN, TIMESTAMP_COLUMN];
    headers.extend(EventField::ALL.iter().map(|field| field.as_str()));
    headers
}

/// 按给定顺序写出读数表格。
pub fn write_events_csv<W: io::Write>(
    writer: W,
    events: &[EventRecord],
) -> Result<(), TransferError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(export_headers())?;
    for event in events {
        let mut row = vec![
            event.event_id.to_string(),
            event.meter_id.to_string(),
            format_timestamp_ms(event.ts_ms),
        ];
        row.extend(EventField::ALL.iter().map(|field| {
            event
                .reading
                .value(*field)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
