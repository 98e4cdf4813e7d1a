//! Collector configuration.
//!
//! Every section is defaulted, so an empty JSON object is a valid configuration.

use cloudscope_api::CloudProvider;
use cloudscope_ingest::RuntimeConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the default configuration file.
pub const CONFIG_ENV: &str = "CLOUDSCOPE_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct SubscriptionSection {
    pub id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ProviderSection {
    pub name: String,
    pub subscription: SubscriptionSection,
    /// JSON inventory served by the local provider.
    pub inventory_path: Option<PathBuf>,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            name: CloudProvider::Azure.as_str().to_string(),
            subscription: SubscriptionSection::default(),
            inventory_path: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct CacheSection {
    pub prefix: String,
    /// Base ttl unit in seconds.
    pub ttl: u64,
    pub query_ttl_units: u32,
    pub provider_ttl_units: u32,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            prefix: "app".to_string(),
            ttl: 60,
            query_ttl_units: 1,
            provider_ttl_units: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct BusSection {
    pub exchange: String,
    pub routing_key: String,
    pub queue: String,
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            exchange: "collector".to_string(),
            routing_key: "backstage".to_string(),
            queue: "manifests".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct RuntimeSection {
    pub workers: usize,
    pub queue_capacity: usize,
    pub drain_timeout_ms: u64,
}

impl Default for RuntimeSection {
    fn default() -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            workers: defaults.workers,
            queue_capacity: defaults.queue_capacity,
            drain_timeout_ms: defaults.drain_timeout_ms,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(default)]
pub struct CollectorConfig {
    pub provider: ProviderSection,
    pub cache: CacheSection,
    pub bus: BusSection,
    pub runtime: RuntimeSection,
    pub server: ServerSection,
}

impl CollectorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: CollectorConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from an explicit path, else from `CLOUDSCOPE_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider_kind()?;
        if self.cache.ttl == 0 {
            return Err(ConfigError::Invalid("cache.ttl must be positive".to_string()));
        }
        let units = self
            .cache
            .query_ttl_units
            .max(self.cache.provider_ttl_units);
        if self.base_ttl().checked_mul(units).is_none() {
            return Err(ConfigError::Invalid(format!(
                "cache.ttl {}s times {units} units overflows",
                self.cache.ttl
            )));
        }
        if self.runtime.workers == 0 {
            return Err(ConfigError::Invalid(
                "runtime.workers must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn provider_kind(&self) -> Result<CloudProvider, ConfigError> {
        self.provider
            .name
            .parse::<CloudProvider>()
            .map_err(|name| ConfigError::Invalid(format!("unknown provider `{name}`")))
    }

    pub fn base_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl)
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            workers: self.runtime.workers,
            queue_capacity: self.runtime.queue_capacity,
            drain_timeout_ms: self.runtime.drain_timeout_ms,
        }
    }
}
