use ems_storage::StorageError;

/// 告警链路错误。
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("invalid alert rule: {0}")]
    Invalid(String),
}
