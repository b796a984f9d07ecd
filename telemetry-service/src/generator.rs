//! Periodic producer of synthetic readings for demos and load tests.

use std::time::Duration;

use rand::Rng;
use serde_json::{json, Value};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::TelemetryApi;

pub const SOLAR_OUTPUT_RANGE: (f64, f64) = (5.0, 50.0);
pub const BATTERY_LEVEL_RANGE: (f64, f64) = (20.0, 100.0);
pub const DIESEL_USAGE_RANGE: (f64, f64) = (0.0, 5.0);

/// One uniformly drawn reading, each value rounded to 2 decimals, as an ingest payload.
pub fn synthetic_reading<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let mut draw = |(lo, hi): (f64, f64)| round2(rng.random_range(lo..=hi));

    json!({
        "solar_output": draw(SOLAR_OUTPUT_RANGE),
        "battery_level": draw(BATTERY_LEVEL_RANGE),
        "diesel_usage": draw(DIESEL_USAGE_RANGE),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub struct DataGenerator {
    api: TelemetryApi,
    interval: Duration,
}

impl DataGenerator {
    pub fn new(api: TelemetryApi, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Submits one reading per interval until `shutdown` is cancelled.
    ///
    /// A failed ingest is logged and skipped; the next tick simply tries again.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.interval.as_secs_f64(),
            "starting continuous data generation"
        );

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }

        tracing::info!("data generation stopped");
    }

    async fn tick(&self) {
        let payload = synthetic_reading(&mut rand::rng());

        match self.api.ingest(&payload).await {
            Ok(reading) => tracing::info!(id = reading.id, "generated: {reading}"),
            Err(e) => tracing::warn!(error = %e, "generated reading was not stored"),
        }
    }
}
