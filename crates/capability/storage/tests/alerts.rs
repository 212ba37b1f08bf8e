use domain::EventField;
use ems_storage::{
    AlertRuleStore, AlertRuleUpdate, InMemoryAlertStore, NewAlertRule, TriggeredAlertStore,
};

fn rule(meter_id: i64) -> NewAlertRule {
    NewAlertRule {
        meter_id,
        parameter: EventField::AvgCurrent,
        threshold: 26.0,
        message: "High current".to_string(),
        is_active: true,
    }
}

#[tokio::test]
async fn create_and_update_rule() {
    let store = InMemoryAlertStore::new();
    let created = store.create_rule(rule(101)).await.expect("create");
    assert_eq!(created.alert_id, 1);

    let updated = store
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                threshold: Some(30.0),
                parameter: Some(EventField::TotalKw),
                ..AlertRuleUpdate::default()
            },
            5_000,
        )
        .await
        .expect("update")
        .expect("rule");
    assert_eq!(updated.threshold, 30.0);
    assert_eq!(updated.parameter, EventField::TotalKw);
    assert_eq!(updated.message, "High current");

    let missing = store
        .update_rule(99, AlertRuleUpdate::default(), 5_000)
        .await
        .expect("update");
    assert!(missing.is_none());
}

#[tokio::test]
async fn list_active_rules_skips_inactive() {
    let store = InMemoryAlertStore::new();
    store.create_rule(rule(101)).await.expect("create");
    store
        .create_rule(NewAlertRule {
            is_active: false,
            ..rule(102)
        })
        .await
        .expect("create");

    assert_eq!(store.list_rules().await.expect("list").len(), 2);
    let active = store.list_active_rules().await.expect("list");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].meter_id, 101);
}

#[tokio::test]
async fn open_trigger_allows_one_active_per_rule() {
    let store = InMemoryAlertStore::new();
    let created = store.create_rule(rule(101)).await.expect("create");

    let opened = store
        .open_trigger(created.alert_id, 1000)
        .await
        .expect("open")
        .expect("trigger");
    assert!(opened.is_active);
    assert_eq!(opened.meter_id, 101);
    assert_eq!(opened.message, "High current");
    assert!(opened.end_ms.is_none());

    let again = store.open_trigger(created.alert_id, 2000).await.expect("open");
    assert!(again.is_none());
    assert_eq!(store.list_active_triggers().await.expect("list").len(), 1);
}

#[tokio::test]
async fn open_trigger_requires_active_rule() {
    let store = InMemoryAlertStore::new();
    assert!(store.open_trigger(42, 1000).await.expect("open").is_none());

    let inactive = store
        .create_rule(NewAlertRule {
            is_active: false,
            ..rule(101)
        })
        .await
        .expect("create");
    assert!(
        store
            .open_trigger(inactive.alert_id, 1000)
            .await
            .expect("open")
            .is_none()
    );
}

#[tokio::test]
async fn close_triggers_keeps_history() {
    let store = InMemoryAlertStore::new();
    let created = store.create_rule(rule(101)).await.expect("create");
    store.open_trigger(created.alert_id, 1000).await.expect("open");

    let closed = store.close_triggers(created.alert_id, 5000).await.expect("close");
    assert_eq!(closed, 1);
    assert_eq!(store.close_triggers(created.alert_id, 6000).await.expect("close"), 0);
    assert!(store.list_active_triggers().await.expect("list").is_empty());

    let history = store
        .list_triggers_for_rule(created.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_active);
    assert_eq!(history[0].end_ms, Some(5000));
}

#[tokio::test]
async fn delete_rule_closes_open_trigger() {
    let store = InMemoryAlertStore::new();
    let created = store.create_rule(rule(101)).await.expect("create");
    store.open_trigger(created.alert_id, 1000).await.expect("open");

    assert!(store.delete_rule(created.alert_id, 7000).await.expect("delete"));
    assert!(store.find_rule(created.alert_id).await.expect("find").is_none());
    assert!(store.list_active_triggers().await.expect("list").is_empty());

    let history = store
        .list_triggers_for_rule(created.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].end_ms, Some(7000));

    assert!(!store.delete_rule(created.alert_id, 8000).await.expect("delete"));
}

#[tokio::test]
async fn active_triggers_are_newest_first() {
    let store = InMemoryAlertStore::new();
    let first = store.create_rule(rule(101)).await.expect("create");
    let second = store.create_rule(rule(102)).await.expect("create");
    store.open_trigger(first.alert_id, 1000).await.expect("open");
    store.open_trigger(second.alert_id, 3000).await.expect("open");

    let active = store.list_active_triggers().await.expect("list");
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].alert_id, second.alert_id);
    assert_eq!(active[1].alert_id, first.alert_id);
}

#[tokio::test]
async fn update_closes_trigger_when_rule_content_changes() {
    let store = InMemoryAlertStore::new();
    let created = store.create_rule(rule(101)).await.expect("create");
    store
        .open_trigger(created.alert_id, 1_000)
        .await
        .expect("open")
        .expect("trigger");

    // 取值与原规则相同，不算变化
    store
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                meter_id: Some(101),
                threshold: Some(26.0),
                ..AlertRuleUpdate::default()
            },
            2_000,
        )
        .await
        .expect("update");
    assert_eq!(store.list_active_triggers().await.expect("list").len(), 1);

    let updated = store
        .update_rule(
            created.alert_id,
            AlertRuleUpdate {
                meter_id: Some(102),
                message: Some("Shop 2 high current".to_string()),
                ..AlertRuleUpdate::default()
            },
            3_000,
        )
        .await
        .expect("update")
        .expect("rule");
    assert_eq!(updated.meter_id, 102);
    assert!(store.list_active_triggers().await.expect("list").is_empty());

    let history = store
        .list_triggers_for_rule(created.alert_id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].end_ms, Some(3_000));
    assert_eq!(history[0].message, "High current");
}
