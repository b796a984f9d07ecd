use std::sync::Arc;

use energy_client::{EnergyReading, ReadingStore, StorageError};
use serde_json::Value;

use super::{error::ApiError, validation};

/// Ingest and list operations over a [`ReadingStore`], independent of the transport.
#[derive(Clone)]
pub struct TelemetryApi {
    store: Arc<dyn ReadingStore>,
    default_limit: u32,
}

impl TelemetryApi {
    pub fn new(store: Arc<dyn ReadingStore>, default_limit: u32) -> Self {
        Self {
            store,
            default_limit: default_limit.max(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn ReadingStore> {
        &self.store
    }

    /// Validates the payload shape and appends one reading.
    pub async fn ingest(&self, payload: &Value) -> Result<EnergyReading, ApiError> {
        metrics::counter!("energy_ingest_requests_total").increment(1);

        let reading = validation::parse_reading(payload).map_err(|errors| {
            metrics::counter!("energy_ingest_rejected_total").increment(1);
            tracing::debug!(fields = ?errors.keys().collect::<Vec<_>>(), "rejected ingest payload");
            ApiError::Validation(errors)
        })?;

        if !(0.0..=100.0).contains(&reading.battery_level) {
            metrics::counter!("energy_battery_level_out_of_range_total").increment(1);
            tracing::warn!(
                battery_level = reading.battery_level,
                "battery level outside 0-100%, storing as-is"
            );
        }

        let stored = self
            .store
            .append(reading)
            .await
            .map_err(|e| storage_failure("append", e))?;

        metrics::counter!("energy_ingested_readings_total").increment(1);
        tracing::debug!(id = stored.id, "reading stored");
        Ok(stored)
    }

    /// Most recent readings, newest first. `limit` is the raw query value.
    pub async fn list(&self, limit: Option<&str>) -> Result<Vec<EnergyReading>, ApiError> {
        metrics::counter!("energy_list_requests_total").increment(1);

        let limit = self.resolve_limit(limit);
        self.store
            .list_recent(Some(limit))
            .await
            .map_err(|e| storage_failure("list_recent", e))
    }

    /// Absent or unparsable limits fall back to the default; anything below 1 becomes 1.
    pub fn resolve_limit(&self, raw: Option<&str>) -> u32 {
        match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
            Some(n) if n < 1 => 1,
            Some(n) => u32::try_from(n).unwrap_or(u32::MAX),
            None => self.default_limit,
        }
    }
}

fn storage_failure(op: &'static str, e: StorageError) -> ApiError {
    tracing::error!(error = %e, op, "reading store failure");
    metrics::counter!("energy_storage_errors_total").increment(1);
    ApiError::Storage(e)
}
