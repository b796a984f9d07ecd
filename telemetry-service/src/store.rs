use std::sync::Arc;

use energy_client::{
    store::{MemoryReadingStore, PgReadingStore},
    ReadingStore,
};
use sqlx::postgres::PgPoolOptions;

use crate::config::{AppConfig, StoreKind};

/// Opens the configured reading store. The Postgres pool is only created when needed.
pub async fn open(cfg: &AppConfig) -> anyhow::Result<Arc<dyn ReadingStore>> {
    match cfg.store.kind {
        StoreKind::Memory => {
            tracing::warn!("using in-memory reading store; readings are lost on restart");
            Ok(Arc::new(MemoryReadingStore::new()))
        }
        StoreKind::Postgres => {
            let uri = cfg
                .database
                .uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("database.uri is required for the postgres store"))?;

            let pool = PgPoolOptions::new()
                .max_connections(cfg.database.max_connections)
                .connect(uri)
                .await?;

            let store = PgReadingStore::new(pool);
            if cfg.database.ensure_schema {
                store.ensure_schema().await?;
            }
            Ok(Arc::new(store))
        }
    }
}
