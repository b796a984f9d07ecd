use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::{effective_limit, ReadingStore, StorageError};
use crate::domain::{EnergyReading, NewEnergyReading};

/// In-process store. Nothing survives a restart.
///
/// `id` and `timestamp` are assigned under the write lock and the timestamp never
/// goes below the previous one, so the vector is always sorted by `(timestamp, id)`.
#[derive(Debug)]
pub struct MemoryReadingStore {
    readings: RwLock<Vec<EnergyReading>>,
    now: fn() -> OffsetDateTime,
}

impl Default for MemoryReadingStore {
    fn default() -> Self {
        Self::with_clock(OffsetDateTime::now_utc)
    }
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose timestamps come from `now` instead of the system clock.
    pub fn with_clock(now: fn() -> OffsetDateTime) -> Self {
        Self {
            readings: RwLock::new(Vec::new()),
            now,
        }
    }
}

#[async_trait::async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn append(&self, reading: NewEnergyReading) -> Result<EnergyReading, StorageError> {
        let mut readings = self.readings.write().await;

        let now = (self.now)();
        let (id, timestamp) = match readings.last() {
            Some(last) => (last.id + 1, last.timestamp.max(now)),
            None => (1, now),
        };

        let stored = reading.into_reading(id, timestamp);
        readings.push(stored.clone());
        Ok(stored)
    }

    async fn list_recent(&self, limit: Option<u32>) -> Result<Vec<EnergyReading>, StorageError> {
        let limit = effective_limit(limit) as usize;
        let readings = self.readings.read().await;
        Ok(readings.iter().rev().take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.readings.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            atomic::{AtomicI64, Ordering},
            Arc,
        },
    };

    use time::{macros::datetime, Duration};

    use super::*;
    use crate::store::DEFAULT_LIST_LIMIT;

    fn reading(solar_output: f64) -> NewEnergyReading {
        NewEnergyReading {
            solar_output,
            battery_level: 50.0,
            diesel_usage: 1.0,
        }
    }

    #[tokio::test]
    async fn append_assigns_unique_ids_and_non_decreasing_timestamps() {
        let store = MemoryReadingStore::new();

        let mut previous: Option<EnergyReading> = None;
        for i in 0..20 {
            let r = store.append(reading(f64::from(i))).await.unwrap();
            if let Some(prev) = &previous {
                assert!(r.id > prev.id);
                assert!(r.timestamp >= prev.timestamp);
            }
            previous = Some(r);
        }
    }

    #[tokio::test]
    async fn append_returns_values_as_given() {
        let store = MemoryReadingStore::new();
        let before = OffsetDateTime::now_utc();

        let r = store
            .append(NewEnergyReading {
                solar_output: 12.5,
                battery_level: 87.3,
                diesel_usage: 1.2,
            })
            .await
            .unwrap();

        assert_eq!(r.id, 1);
        assert_eq!(r.solar_output, 12.5);
        assert_eq!(r.battery_level, 87.3);
        assert_eq!(r.diesel_usage, 1.2);
        assert!(r.timestamp >= before);
        assert!(r.timestamp <= OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn out_of_range_battery_level_is_accepted() {
        let store = MemoryReadingStore::new();
        let r = store
            .append(NewEnergyReading {
                solar_output: 1.0,
                battery_level: 140.0,
                diesel_usage: 0.0,
            })
            .await
            .unwrap();
        assert_eq!(r.battery_level, 140.0);
    }

    fn fixed_clock() -> OffsetDateTime {
        datetime!(2024-01-01 00:00:00 UTC)
    }

    #[tokio::test]
    async fn equal_timestamps_are_ordered_by_id_descending() {
        let store = MemoryReadingStore::with_clock(fixed_clock);
        for i in 0..5 {
            store.append(reading(f64::from(i))).await.unwrap();
        }

        let recent = store.list_recent(None).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
        assert!(recent.iter().all(|r| r.timestamp == fixed_clock()));

        let ids: Vec<i64> = store
            .list_recent(Some(2))
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![5, 4]);
    }

    static BACKWARDS_TICKS: AtomicI64 = AtomicI64::new(0);

    // Each call is one minute earlier than the previous one.
    fn backwards_clock() -> OffsetDateTime {
        let tick = BACKWARDS_TICKS.fetch_add(1, Ordering::SeqCst);
        fixed_clock() - Duration::minutes(tick)
    }

    #[tokio::test]
    async fn timestamps_never_go_backwards_with_the_clock() {
        let store = MemoryReadingStore::with_clock(backwards_clock);
        for i in 0..4 {
            store.append(reading(f64::from(i))).await.unwrap();
        }

        let recent = store.list_recent(None).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);

        let first = recent.last().unwrap().timestamp;
        assert!(recent.iter().all(|r| r.timestamp == first));
    }

    #[tokio::test]
    async fn list_recent_on_empty_store_is_empty() {
        let store = MemoryReadingStore::new();
        assert!(store.list_recent(None).await.unwrap().is_empty());
        assert!(store.list_recent(Some(5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_bounded() {
        let store = MemoryReadingStore::new();
        for i in 0..10 {
            store.append(reading(f64::from(i))).await.unwrap();
        }

        let recent = store.list_recent(Some(3)).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 9, 8]);

        for pair in recent.windows(2) {
            assert!((pair[0].timestamp, pair[0].id) > (pair[1].timestamp, pair[1].id));
        }
    }

    #[tokio::test]
    async fn list_recent_defaults_to_fifty() {
        let store = MemoryReadingStore::new();
        for _ in 0..60 {
            store.append(reading(1.0)).await.unwrap();
        }

        assert_eq!(store.list_recent(None).await.unwrap().len(), DEFAULT_LIST_LIMIT as usize);
        assert_eq!(store.list_recent(Some(0)).await.unwrap().len(), 1);
        assert_eq!(store.list_recent(Some(100)).await.unwrap().len(), 60);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_get_distinct_ids() {
        let store = Arc::new(MemoryReadingStore::new());

        let tasks = (0..100).map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.append(reading(f64::from(i))).await })
        });
        let results = futures::future::join_all(tasks).await;

        let ids: HashSet<i64> = results
            .into_iter()
            .map(|r| r.unwrap().unwrap().id)
            .collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(store.count().await.unwrap(), 100);

        let listed = store.list_recent(Some(100)).await.unwrap();
        for pair in listed.windows(2) {
            assert!((pair[0].timestamp, pair[0].id) > (pair[1].timestamp, pair[1].id));
        }
    }
}
