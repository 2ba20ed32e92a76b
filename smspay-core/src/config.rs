//! Configuration for the purchase engine.
//!
//! Loaded from a JSON file, with environment variable overrides (a `.env`
//! file is honoured through `dotenv`).

use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use smspay_common::models::{NetworkIdentity, Product};
use crate::purchase::DriverSettings;
use crate::services::catalogue::DestinationRange;
use crate::Error;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SMSPAY_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "smspay.json";

/// Pacing interval distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub min_secs: u32,
    pub max_secs: u32,
    /// Fixed seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            min_secs: 5,
            max_secs: 30,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the eligibility / reporting service.
    pub api_endpoint: String,
    pub sdk_key: String,
    pub database_url: String,
    /// Use the loopback transmitter instead of a real one.
    pub test_mode: bool,
    pub network: NetworkIdentity,
    pub destination_range: DestinationRange,
    pub intervals: IntervalConfig,
    pub products: Vec<Product>,
    pub purchase: DriverSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_endpoint: "http://localhost:8080/api/v1/".to_string(),
            sdk_key: String::new(),
            database_url: "sqlite://./data/smspay.db".to_string(),
            test_mode: true,
            network: NetworkIdentity::default(),
            destination_range: DestinationRange {
                start: 447_700_900_000,
                end: 447_700_900_999,
            },
            intervals: IntervalConfig::default(),
            products: Vec::new(),
            purchase: DriverSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file (`SMSPAY_CONFIG`, default `smspay.json`)
    /// 3. Defaults
    pub fn load() -> Result<Self, Error> {
        dotenv::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Like [`AppConfig::load`] but with an explicit file path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::from_file(path)?
        } else {
            debug!("No config file at {}; using defaults", path.display());
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies overrides from a key lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SMSPAY_API_ENDPOINT") {
            self.api_endpoint = v;
        }
        if let Some(v) = lookup("SMSPAY_SDK_KEY") {
            self.sdk_key = v;
        }
        if let Some(v) = lookup("SMSPAY_DATABASE_URL") {
            self.database_url = v;
        }
        if let Some(v) = lookup("SMSPAY_TEST_MODE") {
            self.test_mode = parse_bool(&v)
                .ok_or_else(|| Error::Config(format!("SMSPAY_TEST_MODE: '{v}' is not a boolean")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.intervals.min_secs == 0 || self.intervals.min_secs > self.intervals.max_secs {
            return Err(Error::Config(format!(
                "intervals: need 1 <= min_secs ({}) <= max_secs ({})",
                self.intervals.min_secs, self.intervals.max_secs
            )));
        }
        self.destination_range.validate()?;
        let mut seen = std::collections::HashSet::new();
        for p in &self.products {
            if p.required_sms_count == 0 {
                return Err(Error::Config(format!(
                    "product '{}' must require at least one SMS",
                    p.product_id
                )));
            }
            if !seen.insert(p.product_id.as_str()) {
                return Err(Error::Config(format!("duplicate product id '{}'", p.product_id)));
            }
        }
        Ok(())
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
