//! 读数表格导入导出与时间字符串处理。

pub mod error;
pub mod events_csv;
pub mod timestamp;

pub use error::TransferError;
pub use events_csv::{export_headers, parse_events_csv, write_events_csv};
pub use timestamp::{format_timestamp_ms, parse_timestamp_ms};
