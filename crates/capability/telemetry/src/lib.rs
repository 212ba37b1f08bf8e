//! 追踪、请求 ID 与进程内计数指标。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 计数指标快照。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub alert_evaluations: u64,
    pub alert_evaluation_failures: u64,
    pub triggers_opened: u64,
    pub triggers_closed: u64,
    pub poll_ticks: u64,
    pub events_appended: u64,
    pub events_imported: u64,
}

/// 进程内计数指标，单调递增。
pub struct TelemetryMetrics {
    alert_evaluations: AtomicU64,
    alert_evaluation_failures: AtomicU64,
    triggers_opened: AtomicU64,
    triggers_closed: AtomicU64,
    poll_ticks: AtomicU64,
    events_appended: AtomicU64,
    events_imported: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            alert_evaluations: AtomicU64::new(0),
            alert_evaluation_failures: AtomicU64::new(0),
            triggers_opened: AtomicU64::new(0),
            triggers_closed: AtomicU64::new(0),
            poll_ticks: AtomicU64::new(0),
            events_appended: AtomicU64::new(0),
            events_imported: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            alert_evaluations: self.alert_evaluations.load(Ordering::Relaxed),
            alert_evaluation_failures: self.alert_evaluation_failures.load(Ordering::Relaxed),
            triggers_opened: self.triggers_opened.load(Ordering::Relaxed),
            triggers_closed: self.triggers_closed.load(Ordering::Relaxed),
            poll_ticks: self.poll_ticks.load(Ordering::Relaxed),
            events_appended: self.events_appended.load(Ordering::Relaxed),
            events_imported: self.events_imported.load(Ordering::Relaxed),
        }
    }
}

impl Default for TelemetryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录一次规则评估。
pub fn record_alert_evaluation() {
    metrics().alert_evaluations.fetch_add(1, Ordering::Relaxed);
}

/// 记录一次评估失败（存储错误）。
pub fn record_alert_evaluation_failure() {
    metrics()
        .alert_evaluation_failures
        .fetch_add(1, Ordering::Relaxed);
}

pub fn record_trigger_opened() {
    metrics().triggers_opened.fetch_add(1, Ordering::Relaxed);
}

pub fn record_triggers_closed(count: u64) {
    metrics().triggers_closed.fetch_add(count, Ordering::Relaxed);
}

/// 记录轮询 tick 次数。
pub fn record_poll_tick() {
    metrics().poll_ticks.fetch_add(1, Ordering::Relaxed);
}

pub fn record_events_appended(count: u64) {
    metrics().events_appended.fetch_add(count, Ordering::Relaxed);
}

/// 记录表格导入的读数条数。
pub fn record_events_imported(count: u64) {
    metrics().events_imported.fetch_add(count, Ordering::Relaxed);
}
