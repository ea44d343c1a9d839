//! Settings loading from files and the environment.

use crate::config::BackendConfig;
use config::{Config, Environment, File};
use respcache_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `RESPCACHE_BACKEND__KIND=redis`.
pub const ENV_PREFIX: &str = "RESPCACHE";

/// Top-level store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl StoreSettings {
    /// Load settings from an optional file, then apply environment overrides.
    ///
    /// The file format follows its extension (toml, yaml, json). A missing
    /// file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        Self::from_config(builder.add_source(env_source()))
    }

    /// Load settings from the environment only.
    pub fn from_env() -> Result<Self> {
        Self::from_config(Config::builder().add_source(env_source()))
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Configuration(format!("Failed to load settings: {}", e)))
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
