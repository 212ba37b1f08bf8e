//! Postgres 电表存储实现

use crate::error::StorageError;
use crate::models::MeterRecord;
use crate::traits::MeterStore;
use domain::MeterId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const METER_COLUMNS: &str = "meter_id, location, description, \
     (extract(epoch from installed_at) * 1000)::bigint as installed_at_ms, \
     (extract(epoch from last_calibrated_at) * 1000)::bigint as last_calibrated_at_ms";

pub struct PgMeterStore {
    pub pool: PgPool,
}

impl PgMeterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn meter_from_row(row: &PgRow) -> Result<MeterRecord, StorageError> {
    Ok(MeterRecord {
        meter_id: row.try_get("meter_id")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        installed_at_ms: row.try_get("installed_at_ms")?,
        last_calibrated_at_ms: row.try_get("last_calibrated_at_ms")?,
    })
}

#[async_trait::async_trait]
impl MeterStore for PgMeterStore {
    async fn list_meters(&self) -> Result<Vec<MeterRecord>, StorageError> {
        let sql = format!("select {METER_COLUMNS} from meters order by meter_id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(meter_from_row).collect()
    }

    async fn find_meter(&self, meter_id: MeterId) -> Result<Option<MeterRecord>, StorageError> {
        let sql = format!("select {METER_COLUMNS} from meters where meter_id = $1");
        let row = sqlx::query(&sql)
            .bind(meter_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(meter_from_row).transpose()
    }

    async fn upsert_meter(&self, record: MeterRecord) -> Result<MeterRecord, StorageError> {
        sqlx::query(
            "insert into meters (meter_id, location, description, installed_at, last_calibrated_at) \
             values ($1, $2, $3, to_timestamp($4 / 1000.0), to_timestamp($5 / 1000.0)) \
             on conflict (meter_id) do update set \
             location = excluded.location, \
             description = excluded.description, \
             installed_at = excluded.installed_at, \
             last_calibrated_at = excluded.last_calibrated_at",
        )
        .bind(record.meter_id)
        .bind(&record.location)
        .bind(&record.description)
        .bind(record.installed_at_ms.map(|ms| ms as f64))
        .bind(record.last_calibrated_at_ms.map(|ms| ms as f64))
        .execute(&self.pool)
        .await?;
        Ok(record)
    }
}
