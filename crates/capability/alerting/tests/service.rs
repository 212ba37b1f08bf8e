use async_trait::async_trait;
use domain::{EventField, MeterReading};
use ems_alerting::{AlertError, AlertService, Evaluation, ManualClock, PollSummary};
use ems_storage::{
    AlertRuleStore, AlertRuleUpdate, EventStore, InMemoryAlertStore, InMemoryEventStore,
    InMemoryMeterStore, NewAlertRule, NewEvent, StorageError, TriggeredAlertRecord,
    TriggeredAlertStore,
};
use std::sync::Arc;

fn rule(meter_id: i64, parameter: EventField, threshold: f64) -> NewAlertRule {
    NewAlertRule {
        meter_id,
        parameter,
        threshold,
        message: "over threshold".to_string(),
        is_active: true,
    }
}

async fn push(events: &InMemoryEventStore, meter_id: i64, ts_ms: i64, field: EventField, value: f64) {
    let mut reading = MeterReading::default();
    reading.set(field, Some(value));
    events
        .append_event(NewEvent {
            meter_id,
            ts_ms,
            reading,
        })
        .await
        .expect("append");
}

fn service_with(
    events: Arc<InMemoryEventStore>,
    alerts: Arc<InMemoryAlertStore>,
) -> AlertService {
    AlertService::new(
        Arc::new(InMemoryMeterStore::with_default_meters()),
        alerts.clone(),
        alerts,
        events,
        Arc::new(ManualClock::new(5_000)),
    )
}

#[tokio::test]
async fn create_rule_evaluates_immediately() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    push(&events, 101, 1_000, EventField::AvgCurrent, 27.0).await;
    let service = service_with(events, alerts);

    let created = service
        .create_rule(rule(101, EventField::AvgCurrent, 26.0))
        .await
        .expect("create");
    let active = service.list_active_triggers().await.expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].alert_id, created.alert_id);
    assert_eq!(active[0].start_ms, 5_000);
}

#[tokio::test]
async fn create_rule_rejects_invalid_input() {
    let service = service_with(
        Arc::new(InMemoryEventStore::new()),
        Arc::new(InMemoryAlertStore::new()),
    );

    let err = service
        .create_rule(rule(101, EventField::AvgCurrent, f64::NAN))
        .await
        .expect_err("nan threshold");
    assert!(matches!(err, AlertError::Invalid(_)));

    let err = service
        .create_rule(NewAlertRule {
            message: "   ".to_string(),
            ..rule(101, EventField::AvgCurrent, 26.0)
        })
        .await
        .expect_err("empty message");
    assert!(matches!(err, AlertError::Invalid(_)));

    let err = service
        .create_rule(rule(999, EventField::AvgCurrent, 26.0))
        .await
        .expect_err("unknown meter");
    assert!(matches!(err, AlertError::Invalid(message) if message.contains("999")));

    assert!(service.list_rules().await.expect("list").is_empty());
}

#[tokio::test]
async fn deactivating_rule_closes_open_trigger() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    push(&events, 102, 1_000, EventField::AvgVoltage, 240.0).await;
    let service = service_with(events, alerts);

    let created = service
        .create_rule(rule(102, EventField::AvgVoltage, 232.0))
        .await
        .expect("create");
    assert_eq!(service.list_active_triggers().await.expect("list").len(), 1);

    let updated = service
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                is_active: Some(false),
                ..AlertRuleUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("rule");
    assert!(!updated.is_active);
    assert!(service.list_active_triggers().await.expect("list").is_empty());

    let history = service
        .list_rule_history(created.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].end_ms, Some(5_000));
}

#[tokio::test]
async fn raising_threshold_recovers_alert() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    push(&events, 101, 1_000, EventField::TotalKw, 12.0).await;
    let service = service_with(events, alerts);

    let created = service
        .create_rule(rule(101, EventField::TotalKw, 10.0))
        .await
        .expect("create");
    service
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                threshold: Some(15.0),
                ..AlertRuleUpdate::default()
            },
        )
        .await
        .expect("update");
    assert!(service.list_active_triggers().await.expect("list").is_empty());
}

#[tokio::test]
async fn moving_rule_reopens_trigger_from_current_rule() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    push(&events, 101, 1_000, EventField::AvgCurrent, 30.0).await;
    push(&events, 102, 1_000, EventField::AvgCurrent, 30.0).await;
    let clock = Arc::new(ManualClock::new(5_000));
    let service = AlertService::new(
        Arc::new(InMemoryMeterStore::with_default_meters()),
        alerts.clone(),
        alerts,
        events,
        clock.clone(),
    );

    let created = service
        .create_rule(NewAlertRule {
            message: "shop1 high".to_string(),
            ..rule(101, EventField::AvgCurrent, 26.0)
        })
        .await
        .expect("create");

    clock.set(8_000);
    service
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                meter_id: Some(102),
                message: Some("shop2 high".to_string()),
                ..AlertRuleUpdate::default()
            },
        )
        .await
        .expect("update")
        .expect("rule");

    let active = service.list_active_triggers().await.expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].meter_id, 102);
    assert_eq!(active[0].message, "shop2 high");
    assert_eq!(active[0].start_ms, 8_000);

    let history = service
        .list_rule_history(created.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].meter_id, 101);
    assert_eq!(history[1].message, "shop1 high");
    assert_eq!(history[1].end_ms, Some(8_000));
}

#[tokio::test]
async fn reactivating_unchanged_rule_keeps_open_trigger() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    push(&events, 101, 1_000, EventField::AvgCurrent, 30.0).await;
    let service = service_with(events, alerts);

    let created = service
        .create_rule(rule(101, EventField::AvgCurrent, 26.0))
        .await
        .expect("create");
    let before = service.list_active_triggers().await.expect("list");
    service
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                is_active: Some(true),
                message: Some("over threshold".to_string()),
                ..AlertRuleUpdate::default()
            },
        )
        .await
        .expect("update");
    let after = service.list_active_triggers().await.expect("list");
    assert_eq!(before, after);
}

#[tokio::test]
async fn update_missing_rule_returns_none() {
    let service = service_with(
        Arc::new(InMemoryEventStore::new()),
        Arc::new(InMemoryAlertStore::new()),
    );
    let updated = service
        .update_rule(77, AlertRuleUpdate::default())
        .await
        .expect("update");
    assert!(updated.is_none());
}

#[tokio::test]
async fn delete_rule_leaves_no_active_trigger() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    push(&events, 101, 1_000, EventField::AvgCurrent, 30.0).await;
    let service = service_with(events, alerts);

    let created = service
        .create_rule(rule(101, EventField::AvgCurrent, 26.0))
        .await
        .expect("create");
    assert!(service.delete_rule(created.alert_id).await.expect("delete"));
    assert!(service.list_active_triggers().await.expect("list").is_empty());
    assert!(service.find_rule(created.alert_id).await.expect("find").is_none());
    assert_eq!(
        service.evaluate(created.alert_id).await.expect("evaluate"),
        Evaluation::RuleMissing
    );

    let history = service
        .list_rule_history(created.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_active);

    assert!(!service.delete_rule(created.alert_id).await.expect("delete"));
}

/// 对指定规则的写操作返回存储错误。
struct FlakyTriggers {
    inner: Arc<InMemoryAlertStore>,
    failing_alert_id: i64,
}

#[async_trait]
impl TriggeredAlertStore for FlakyTriggers {
    async fn open_trigger(
        &self,
        alert_id: i64,
        started_at_ms: i64,
    ) -> Result<Option<TriggeredAlertRecord>, StorageError> {
        if alert_id == self.failing_alert_id {
            return Err(StorageError::new("connection reset"));
        }
        self.inner.open_trigger(alert_id, started_at_ms).await
    }

    async fn close_triggers(&self, alert_id: i64, ended_at_ms: i64) -> Result<u64, StorageError> {
        if alert_id == self.failing_alert_id {
            return Err(StorageError::new("connection reset"));
        }
        self.inner.close_triggers(alert_id, ended_at_ms).await
    }

    async fn list_active_triggers(&self) -> Result<Vec<TriggeredAlertRecord>, StorageError> {
        self.inner.list_active_triggers().await
    }

    async fn list_triggers_for_rule(
        &self,
        alert_id: i64,
    ) -> Result<Vec<TriggeredAlertRecord>, StorageError> {
        self.inner.list_triggers_for_rule(alert_id).await
    }
}

#[tokio::test]
async fn failing_rule_does_not_stop_the_others() {
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    let first = alerts
        .create_rule(rule(101, EventField::AvgCurrent, 26.0))
        .await
        .expect("create");
    let second = alerts
        .create_rule(rule(102, EventField::AvgCurrent, 26.0))
        .await
        .expect("create");
    push(&events, 101, 1_000, EventField::AvgCurrent, 30.0).await;
    push(&events, 102, 1_000, EventField::AvgCurrent, 30.0).await;

    let triggers = Arc::new(FlakyTriggers {
        inner: alerts.clone(),
        failing_alert_id: first.alert_id,
    });
    let service = AlertService::new(
        Arc::new(InMemoryMeterStore::with_default_meters()),
        alerts.clone(),
        triggers,
        events,
        Arc::new(ManualClock::new(5_000)),
    );

    let summary = service.evaluate_active_rules().await.expect("poll");
    assert_eq!(
        summary,
        PollSummary {
            evaluated: 2,
            failed: 1
        }
    );
    let active = service.list_active_triggers().await.expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].alert_id, second.alert_id);

    let err = service.evaluate(first.alert_id).await.expect_err("storage");
    assert!(matches!(err, AlertError::Storage(_)));
}
