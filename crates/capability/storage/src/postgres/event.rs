//! Postgres 读数存储实现
//!
//! 读数列名取自 `EventField::column`，插入与查询的列顺序一致。

use crate::error::StorageError;
use crate::models::{EventQuery, EventRecord, NewEvent, TimeOrder};
use crate::traits::EventStore;
use domain::{EventField, MeterId, MeterReading};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row};

pub struct PgEventStore {
    pub pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn reading_columns() -> String {
    EventField::ALL
        .iter()
        .map(|field| field.column())
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_columns() -> String {
    format!(
        "event_id, meter_id, (extract(epoch from ts) * 1000)::bigint as ts_ms, {}",
        reading_columns()
    )
}

fn insert_sql() -> String {
    // $1 meter_id, $2 ts_ms, $3.. 读数
    let placeholders = (0..EventField::ALL.len())
        .map(|index| format!("${}", index + 3))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "insert into events (meter_id, ts, {}) \
         values ($1, to_timestamp($2 / 1000.0), {placeholders}) \
         returning event_id",
        reading_columns()
    )
}

fn event_from_row(row: &PgRow) -> Result<EventRecord, StorageError> {
    let mut reading = MeterReading::default();
    for field in EventField::ALL {
        let value: Option<f64> = row.try_get(field.column())?;
        reading.set(field, value);
    }
    Ok(EventRecord {
        event_id: row.try_get("event_id")?,
        meter_id: row.try_get("meter_id")?,
        ts_ms: row.try_get("ts_ms")?,
        reading,
    })
}

fn bind_event<'q>(
    sql: &'q str,
    event: &NewEvent,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query(sql)
        .bind(event.meter_id)
        .bind(event.ts_ms as f64);
    for field in EventField::ALL {
        query = query.bind(event.reading.value(field));
    }
    query
}

#[async_trait::async_trait]
impl EventStore for PgEventStore {
    async fn append_event(&self, event: NewEvent) -> Result<EventRecord, StorageError> {
        let sql = insert_sql();
        let row = bind_event(&sql, &event).fetch_one(&self.pool).await?;
        Ok(EventRecord {
            event_id: row.try_get("event_id")?,
            meter_id: event.meter_id,
            ts_ms: event.ts_ms,
            reading: event.reading,
        })
    }

    async fn append_events(&self, events: &[NewEvent]) -> Result<usize, StorageError> {
        if events.is_empty() {
            return Ok(0);
        }
        let sql = insert_sql();
        let mut tx = self.pool.begin().await?;
        for event in events {
            bind_event(&sql, event).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(events.len())
    }

    async fn latest_event(&self, meter_id: MeterId) -> Result<Option<EventRecord>, StorageError> {
        let sql = format!(
            "select {} from events where meter_id = $1 \
             order by ts desc, event_id desc limit 1",
            select_columns()
        );
        let row = sqlx::query(&sql)
            .bind(meter_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(event_from_row).transpose()
    }

    async fn latest_events(&self) -> Result<Vec<EventRecord>, StorageError> {
        let sql = format!(
            "select distinct on (meter_id) {} from events \
             order by meter_id, ts desc, event_id desc",
            select_columns()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(event_from_row).collect()
    }

    async fn query_events(&self, query: EventQuery) -> Result<Vec<EventRecord>, StorageError> {
        let order_by = match query.order {
            TimeOrder::Asc => "asc",
            TimeOrder::Desc => "desc",
        };
        let sql = format!(
            "select {} from events \
             where ($1::bigint is null or meter_id = $1) \
             and ($2::double precision is null or ts >= to_timestamp($2 / 1000.0)) \
             and ($3::double precision is null or ts <= to_timestamp($3 / 1000.0)) \
             order by ts {order_by}, event_id {order_by}",
            select_columns()
        );
        let rows = sqlx::query(&sql)
            .bind(query.meter_id)
            .bind(query.from_ms.map(|ms| ms as f64))
            .bind(query.to_ms.map(|ms| ms as f64))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(event_from_row).collect()
    }
}
