use std::{env, time::Duration};

use anyhow::{bail, Result};
use telemetry_service::{
    config::{AppConfig, StoreKind},
    observability, shutdown, store, DataGenerator, TelemetryApi,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration (TELEMETRY_CONFIG can point at a generator-specific file).
    let cfg = AppConfig::load()?;

    let interval_secs = match env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => bail!("usage: generate_data [interval_secs]"),
        },
        None => cfg.generator.interval_secs,
    };

    if cfg.store.kind == StoreKind::Memory {
        tracing::warn!(
            "store.kind = \"memory\": generated readings are not visible to other processes"
        );
    }

    let store = store::open(&cfg).await?;
    let api = TelemetryApi::new(store, cfg.api.default_limit);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown::cancel_on_signal(shutdown.clone()));

    DataGenerator::new(api, Duration::from_secs(interval_secs))
        .run(shutdown)
        .await;

    Ok(())
}
