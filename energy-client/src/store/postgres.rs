use sqlx::postgres::PgPool;
use time::OffsetDateTime;

use super::{effective_limit, ReadingStore, StorageError};
use crate::domain::{EnergyReading, NewEnergyReading};

const SCHEMA_SQL: &str = include_str!("../../sql/energy_readings.sql");

/// Readings stored in the `energy_readings` table.
///
/// Ids come from the `BIGSERIAL` sequence; the timestamp is taken in `append` and the
/// row is read back with `RETURNING` so callers see the stored precision.
///
/// The timestamp is raised to the newest stored `ts` when the application clock is
/// behind it, so sequential appends never sort below older readings. Appends racing
/// on separate connections can still commit out of timestamp order; ties and
/// such races are ordered by `id`.
#[derive(Debug, Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the table and its index if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ReadingStore for PgReadingStore {
    async fn append(&self, reading: NewEnergyReading) -> Result<EnergyReading, StorageError> {
        let ts = OffsetDateTime::now_utc();

        let stored = sqlx::query_as::<_, EnergyReading>(
            r#"
            INSERT INTO energy_readings (ts, solar_output, battery_level, diesel_usage)
            VALUES (
                GREATEST($1, COALESCE((SELECT MAX(ts) FROM energy_readings), $1)),
                $2, $3, $4
            )
            RETURNING id, ts, solar_output, battery_level, diesel_usage
            "#,
        )
        .bind(ts)
        .bind(reading.solar_output)
        .bind(reading.battery_level)
        .bind(reading.diesel_usage)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<EnergyReading>, StorageError> {
        let rows = sqlx::query_as::<_, EnergyReading>(
            r#"
            SELECT id, ts, solar_output, battery_level, diesel_usage
            FROM energy_readings
            ORDER BY ts DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(i64::from(effective_limit(limit)))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM energy_readings")
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }
}
