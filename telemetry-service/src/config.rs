use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub uri: Option<String>,
    pub max_connections: u32,
    /// Create the readings table on startup when missing.
    pub ensure_schema: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: None,
            max_connections: 8,
            ensure_schema: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub default_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_limit: energy_client::DEFAULT_LIST_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Run the generator inside the HTTP server process.
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub generator: GeneratorConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path =
            env::var("TELEMETRY_CONFIG").unwrap_or_else(|_| "telemetry-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config {path}: {e}"))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        if cfg.store.kind == StoreKind::Postgres && cfg.database.uri.is_none() {
            anyhow::bail!("database.uri is required when store.kind = \"postgres\"");
        }
        if cfg.generator.interval_secs == 0 {
            anyhow::bail!("generator.interval_secs must be positive");
        }
        Ok(cfg)
    }
}
