//! 电表内存存储实现

use crate::error::StorageError;
use crate::models::MeterRecord;
use crate::seed::default_meters;
use crate::traits::MeterStore;
use domain::MeterId;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// 电表内存存储
///
/// BTreeMap 保证按 meter_id 升序遍历。
pub struct InMemoryMeterStore {
    meters: RwLock<BTreeMap<MeterId, MeterRecord>>,
}

impl InMemoryMeterStore {
    pub fn new() -> Self {
        Self {
            meters: RwLock::new(BTreeMap::new()),
        }
    }

    /// 内置 101..=115 商铺总表
    pub fn with_default_meters() -> Self {
        let meters = default_meters()
            .into_iter()
            .map(|meter| (meter.meter_id, meter))
            .collect();
        Self {
            meters: RwLock::new(meters),
        }
    }
}

impl Default for InMemoryMeterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MeterStore for InMemoryMeterStore {
    async fn list_meters(&self) -> Result<Vec<MeterRecord>, StorageError> {
        let meters = self
            .meters
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(meters.values().cloned().collect())
    }

    async fn find_meter(&self, meter_id: MeterId) -> Result<Option<MeterRecord>, StorageError> {
        let meters = self
            .meters
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(meters.get(&meter_id).cloned())
    }

    async fn upsert_meter(&self, record: MeterRecord) -> Result<MeterRecord, StorageError> {
        let mut meters = self
            .meters
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        meters.insert(record.meter_id, record.clone());
        Ok(record)
    }
}
