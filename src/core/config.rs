use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct EndpointsConfig {
    #[serde(default = "default_storage_fees")]
    pub storage_fees: String,
    #[serde(default = "default_association_fees")]
    pub association_fees: String,
    /// `{id}` is replaced by the category id.
    #[serde(default = "default_buyer_seller_fees")]
    pub buyer_seller_fees: String,
    #[serde(default = "default_car_types")]
    pub car_types: String,
}

fn default_storage_fees() -> String {
    "GetStorageFees".to_string()
}

fn default_association_fees() -> String {
    "GetAssociationFees".to_string()
}

fn default_buyer_seller_fees() -> String {
    "GetBuyerSellerFees/{id}".to_string()
}

fn default_car_types() -> String {
    "GetCarTypes".to_string()
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        EndpointsConfig {
            storage_fees: default_storage_fees(),
            association_fees: default_association_fees(),
            buyer_seller_fees: default_buyer_seller_fees(),
            car_types: default_car_types(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeeServiceConfig {
    pub base_url: String,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

fn default_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeeServiceConfig {
    fn default() -> Self {
        FeeServiceConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            endpoints: EndpointsConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: FeeServiceConfig,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Category id or label selected when none is given on the command line.
    #[serde(default)]
    pub default_category: Option<String>,
    #[serde(default = "default_cache_category_fees")]
    pub cache_category_fees: bool,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_cache_category_fees() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: FeeServiceConfig::default(),
            currency: default_currency(),
            default_category: None,
            cache_category_fees: default_cache_category_fees(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            warn!(
                "No configuration found at {}, using defaults. Run `autofee setup` to create one.",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "autofee", "autofee")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
