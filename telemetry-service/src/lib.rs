pub mod api;
pub mod config;
pub mod generator;
pub mod metrics_server;
pub mod observability;
pub mod shutdown;
pub mod store;

pub use api::{ApiError, TelemetryApi};
pub use generator::DataGenerator;
