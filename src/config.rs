use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "EFC__";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
    #[serde(default)]
    pub enable_cors: bool,
}

fn default_request_timeout() -> u64 { 30 }
fn default_max_upload() -> usize { 16 * 1024 * 1024 }

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig { pub data_csv: PathBuf }

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    pub demand: DemandModelConfig,
    pub wind: WindModelConfig,
    pub solar: SolarModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DemandModelConfig {
    pub model: PathBuf,
    pub scaler: PathBuf,
}

/// On-disk format of the wind regressor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    /// smartcore random forest, bincode encoded
    #[default]
    RandomForest,
    /// JSON coefficients and intercept
    Linear,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindModelConfig {
    pub model: PathBuf,
    pub scaler: PathBuf,
    #[serde(default)]
    pub format: TabularFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolarModelConfig {
    pub model: PathBuf,
    pub feature_scaler: PathBuf,
    pub target_scaler: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file(DEFAULT_CONFIG_PATH))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }
}
