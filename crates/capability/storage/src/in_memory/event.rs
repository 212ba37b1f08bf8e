//! 读数内存存储实现
//!
//! 仅用于本地演示和测试。

use crate::error::StorageError;
use crate::models::{EventQuery, EventRecord, NewEvent, TimeOrder};
use crate::traits::EventStore;
use domain::MeterId;
use std::collections::BTreeMap;
use std::sync::RwLock;

struct EventLog {
    next_id: i64,
    events: Vec<EventRecord>,
}

impl EventLog {
    fn push(&mut self, event: &NewEvent) -> EventRecord {
        let record = EventRecord {
            event_id: self.next_id,
            meter_id: event.meter_id,
            ts_ms: event.ts_ms,
            reading: event.reading.clone(),
        };
        self.next_id += 1;
        self.events.push(record.clone());
        record
    }
}

/// 读数内存存储
pub struct InMemoryEventStore {
    log: RwLock<EventLog>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            log: RwLock::new(EventLog {
                next_id: 1,
                events: Vec::new(),
            }),
        }
    }

    /// 当前累计的读数条数（用于测试）
    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

// 时间倒序，同一时间 event_id 大者在前
fn newer(a: &EventRecord, b: &EventRecord) -> bool {
    (a.ts_ms, a.event_id) > (b.ts_ms, b.event_id)
}

#[async_trait::async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_event(&self, event: NewEvent) -> Result<EventRecord, StorageError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(log.push(&event))
    }

    async fn append_events(&self, events: &[NewEvent]) -> Result<usize, StorageError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for event in events {
            log.push(event);
        }
        Ok(events.len())
    }

    async fn latest_event(&self, meter_id: MeterId) -> Result<Option<EventRecord>, StorageError> {
        let log = self
            .log
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut latest: Option<&EventRecord> = None;
        for event in log.events.iter().filter(|event| event.meter_id == meter_id) {
            if latest.is_none_or(|current| newer(event, current)) {
                latest = Some(event);
            }
        }
        Ok(latest.cloned())
    }

    async fn latest_events(&self) -> Result<Vec<EventRecord>, StorageError> {
        let log = self
            .log
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut latest: BTreeMap<MeterId, &EventRecord> = BTreeMap::new();
        for event in log.events.iter() {
            let replace = latest
                .get(&event.meter_id)
                .is_none_or(|current| newer(event, current));
            if replace {
                latest.insert(event.meter_id, event);
            }
        }
        Ok(latest.into_values().cloned().collect())
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventRecord>, StorageError> {
        let log = self
            .log
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        let mut selected: Vec<EventRecord> = log
            .events
            .iter()
            .filter(|event| query.meter_id.is_none_or(|id| event.meter_id == id))
            .filter(|event| query.from_ms.is_none_or(|from| event.ts_ms >= from))
            .filter(|event| query.to_ms.is_none_or(|to| event.ts_ms <= to))
            .cloned()
            .collect();
        selected.sort_by_key(|event| (event.ts_ms, event.event_id));
        if matches!(query.order, TimeOrder::Desc) {
            selected.reverse();
        }
        Ok(selected)
    }
}
