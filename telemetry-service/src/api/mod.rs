//! HTTP surface of the telemetry API.
//!
//! `POST /energy/` ingests one reading, `GET /energy/?limit=N` lists the newest ones.
//! The same routes are reachable without the trailing slash and under `/api`.

pub mod error;
pub mod service;
pub mod validation;

use std::net::SocketAddr;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use energy_client::EnergyReading;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

pub use error::{ApiError, FieldErrors};
pub use service::TelemetryApi;

pub fn router(api: TelemetryApi) -> Router {
    let energy = Router::new()
        .route("/energy/", get(list_readings).post(create_reading))
        .route("/energy", get(list_readings).post(create_reading));

    Router::new()
        .merge(energy.clone())
        .nest("/api", energy)
        .with_state(api)
}

/// Serves the API until `shutdown` is cancelled, then drains in-flight requests.
pub async fn serve(
    bind_addr: &str,
    api: TelemetryApi,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr: SocketAddr = bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "telemetry API listening");

    axum::serve(listener, router(api).into_make_service())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("telemetry API stopped");
    Ok(())
}

async fn create_reading(
    State(api): State<TelemetryApi>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<EnergyReading>), ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        // `ingest` is never reached, so count the request here.
        metrics::counter!("energy_ingest_requests_total").increment(1);
        metrics::counter!("energy_ingest_rejected_total").increment(1);
        ApiError::from(rejection)
    })?;

    let reading = api.ingest(&payload).await?;
    Ok((StatusCode::CREATED, Json(reading)))
}

async fn list_readings(
    State(api): State<TelemetryApi>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<EnergyReading>>, ApiError> {
    // A repeated or undecodable query never fails the request; the first `limit` wins.
    let params = params.map(|Query(pairs)| pairs).unwrap_or_default();
    let limit = params
        .iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value.as_str());

    let readings = api.list(limit).await?;
    Ok(Json(readings))
}
