use domain::{EventField, MeterReading};
use ems_alerting::{AlertService, Clock, Evaluation, ManualClock};
use ems_storage::{
    EventStore, InMemoryAlertStore, InMemoryEventStore, InMemoryMeterStore, NewAlertRule,
    NewEvent, TriggeredAlertStore,
};
use std::sync::Arc;

struct Fixture {
    events: Arc<InMemoryEventStore>,
    alerts: Arc<InMemoryAlertStore>,
    clock: Arc<ManualClock>,
    service: AlertService,
}

fn fixture() -> Fixture {
    let meters = Arc::new(InMemoryMeterStore::with_default_meters());
    let events = Arc::new(InMemoryEventStore::new());
    let alerts = Arc::new(InMemoryAlertStore::new());
    let clock = Arc::new(ManualClock::new(1_000_000));
    let service = AlertService::new(
        meters,
        alerts.clone(),
        alerts.clone(),
        events.clone(),
        clock.clone(),
    );
    Fixture {
        events,
        alerts,
        clock,
        service,
    }
}

async fn push_reading(fixture: &Fixture, meter_id: i64, field: EventField, value: Option<f64>) {
    let mut reading = MeterReading::default();
    reading.set(field, value);
    fixture
        .events
        .append_event(NewEvent {
            meter_id,
            ts_ms: fixture.clock.now_ms(),
            reading,
        })
        .await
        .expect("append");
    fixture.clock.advance(1_000);
}

fn high_current_rule() -> NewAlertRule {
    NewAlertRule {
        meter_id: 101,
        parameter: EventField::AvgCurrent,
        threshold: 26.0,
        message: "High current".to_string(),
        is_active: true,
    }
}

#[tokio::test]
async fn trigger_opens_once_and_recovers() {
    let fixture = fixture();
    push_reading(&fixture, 101, EventField::AvgCurrent, Some(25.5)).await;
    let rule = fixture
        .service
        .create_rule(high_current_rule())
        .await
        .expect("create");
    assert!(fixture.service.list_active_triggers().await.expect("list").is_empty());

    push_reading(&fixture, 101, EventField::AvgCurrent, Some(27.0)).await;
    let opened_at = fixture.clock.now_ms();
    let outcome = fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
    let Evaluation::Opened(trigger) = outcome else {
        panic!("expected open, got {outcome:?}");
    };
    assert_eq!(trigger.start_ms, opened_at);
    assert_eq!(trigger.meter_id, 101);
    assert_eq!(trigger.message, "High current");
    assert!(trigger.end_ms.is_none());

    let again = fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
    assert_eq!(again, Evaluation::AlreadyOpen);
    assert_eq!(fixture.service.list_active_triggers().await.expect("list").len(), 1);

    push_reading(&fixture, 101, EventField::AvgCurrent, Some(24.0)).await;
    let closed_at = fixture.clock.now_ms();
    let recovered = fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
    assert_eq!(recovered, Evaluation::Closed(1));
    assert!(fixture.service.list_active_triggers().await.expect("list").is_empty());

    let history = fixture
        .service
        .list_rule_history(rule.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_active);
    assert_eq!(history[0].end_ms, Some(closed_at));

    let idle = fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
    assert_eq!(idle, Evaluation::Idle);
    assert_eq!(
        fixture
            .service
            .list_rule_history(rule.alert_id)
            .await
            .expect("history")
            .len(),
        1
    );
}

#[tokio::test]
async fn value_equal_to_threshold_does_not_trigger() {
    let fixture = fixture();
    push_reading(&fixture, 101, EventField::AvgCurrent, Some(26.0)).await;
    let rule = fixture
        .service
        .create_rule(high_current_rule())
        .await
        .expect("create");
    let outcome = fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
    assert_eq!(outcome, Evaluation::Idle);
}

#[tokio::test]
async fn null_field_never_triggers() {
    let fixture = fixture();
    push_reading(&fixture, 101, EventField::AvgVoltage, Some(500.0)).await;
    let rule = fixture
        .service
        .create_rule(high_current_rule())
        .await
        .expect("create");
    assert_eq!(
        fixture.service.evaluate(rule.alert_id).await.expect("evaluate"),
        Evaluation::Idle
    );

    push_reading(&fixture, 101, EventField::AvgCurrent, None).await;
    assert_eq!(
        fixture.service.evaluate(rule.alert_id).await.expect("evaluate"),
        Evaluation::Idle
    );
}

#[tokio::test]
async fn meter_without_events_never_triggers() {
    let fixture = fixture();
    let rule = fixture
        .service
        .create_rule(high_current_rule())
        .await
        .expect("create");
    assert_eq!(
        fixture.service.evaluate(rule.alert_id).await.expect("evaluate"),
        Evaluation::Idle
    );
}

#[tokio::test]
async fn missing_rule_is_a_no_op() {
    let fixture = fixture();
    assert_eq!(
        fixture.service.evaluate(404).await.expect("evaluate"),
        Evaluation::RuleMissing
    );
}

#[tokio::test]
async fn latest_reading_is_taken_from_rule_meter_only() {
    let fixture = fixture();
    push_reading(&fixture, 102, EventField::AvgCurrent, Some(99.0)).await;
    push_reading(&fixture, 101, EventField::AvgCurrent, Some(20.0)).await;
    let rule = fixture
        .service
        .create_rule(high_current_rule())
        .await
        .expect("create");
    assert_eq!(
        fixture.service.evaluate(rule.alert_id).await.expect("evaluate"),
        Evaluation::Idle
    );
}

#[tokio::test]
async fn repeated_evaluation_keeps_one_active_trigger() {
    let fixture = fixture();
    let rule = fixture
        .service
        .create_rule(high_current_rule())
        .await
        .expect("create");
    let readings = [27.0, 28.0, 25.0, 30.0, 31.0, 10.0, 40.0];
    for value in readings {
        push_reading(&fixture, 101, EventField::AvgCurrent, Some(value)).await;
        fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
        fixture.service.evaluate(rule.alert_id).await.expect("evaluate");
        let active = fixture
            .alerts
            .list_triggers_for_rule(rule.alert_id)
            .await
            .expect("history")
            .into_iter()
            .filter(|trigger| trigger.is_active)
            .count();
        assert!(active <= 1);
    }
    // 27 开，25 关，30 开，10 关，40 开
    let history = fixture
        .service
        .list_rule_history(rule.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 3);
    assert!(history[0].is_active);
}
