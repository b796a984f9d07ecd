//! Append-only storage of energy readings.

pub mod memory;
pub mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

use crate::domain::{EnergyReading, NewEnergyReading};

/// Number of readings returned by [`ReadingStore::list_recent`] when no limit is given.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Durable, append-only collection of readings.
///
/// Implementations own identity and timestamp assignment: every appended reading
/// gets a fresh `id` and the current time, and neither ever changes afterwards.
#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persists a reading and returns it exactly as stored.
    async fn append(&self, reading: NewEnergyReading) -> Result<EnergyReading, StorageError>;

    /// Returns up to `limit` readings, newest first, ties broken by `id` descending.
    ///
    /// `None` means [`DEFAULT_LIST_LIMIT`]; zero is treated as one.
    async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<EnergyReading>, StorageError>;

    async fn count(&self) -> Result<u64, StorageError>;
}

pub fn effective_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1)
}
