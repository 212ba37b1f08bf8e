/// 表格导入导出错误。
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing column: {0}")]
    MissingColumn(String),
    /// `line` 为表格中的行号（表头为第 1 行）。
    #[error("line {line}: {message}")]
    Row { line: u64, message: String },
    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}
