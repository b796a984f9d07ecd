use std::time::Duration;

use anyhow::Result;
use telemetry_service::{
    api, config::AppConfig, metrics_server, observability, shutdown, store, DataGenerator,
    TelemetryApi,
};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let store = store::open(&cfg).await?;
    tracing::info!(kind = ?cfg.store.kind, readings = store.count().await?, "reading store ready");

    let api = TelemetryApi::new(store, cfg.api.default_limit);
    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown::cancel_on_signal(shutdown.clone()));

    let generator = cfg.generator.enabled.then(|| {
        let interval = Duration::from_secs(cfg.generator.interval_secs);
        tokio::spawn(DataGenerator::new(api.clone(), interval).run(shutdown.child_token()))
    });

    api::serve(&cfg.server.bind_addr, api, shutdown.clone()).await?;

    // The server may also stop on its own (e.g. listener error); stop the generator either way.
    shutdown.cancel();
    if let Some(handle) = generator {
        handle.await?;
    }

    Ok(())
}
