//! 定时评估全部启用规则。

use crate::service::{AlertService, PollSummary};
use ems_telemetry::record_poll_tick;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// 告警轮询器。
pub struct AlertPoller {
    service: Arc<AlertService>,
    interval: Duration,
}

impl AlertPoller {
    pub fn new(service: Arc<AlertService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// 执行一轮评估。列出规则失败时本轮记为空，下一轮照常执行。
    pub async fn tick(&self) -> PollSummary {
        record_poll_tick();
        match self.service.evaluate_active_rules().await {
            Ok(summary) => {
                debug!(
                    target: "ems.alerting",
                    evaluated = summary.evaluated,
                    failed = summary.failed,
                    "alert_poll_tick"
                );
                summary
            }
            Err(err) => {
                warn!(target: "ems.alerting", error = %err, "alert_poll_list_failed");
                PollSummary::default()
            }
        }
    }

    /// 启动后台轮询；`shutdown` 置为 true 后退出。首轮在一个间隔之后执行。
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            info!(
                target: "ems.alerting",
                interval_ms = self.interval.as_millis() as u64,
                "alert_poller_started"
            );
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.tick().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!(target: "ems.alerting", "alert_poller_stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}
