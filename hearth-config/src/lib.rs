//! # Hearth Configuration System
//!
//! Hierarchical configuration for the hearth home-automation latency simulator.
//!
//! ## Features
//! - **Unified Configuration**: one document for the model and its telemetry
//! - **Validation**: attribute and cross-field checks before any run starts
//! - **Environment Awareness**: per-environment override files and `HEARTH_*` variables

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod simulation;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use simulation::{ActivityConfig, PlacementBounds, SimulationConfig};
pub use telemetry::TelemetryConfig;

/// Base configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/hearth.yaml";

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct HearthConfig {
    /// Model parameters.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging and metrics.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl HearthConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/hearth.yaml` - Base settings. If missing, defaults are used.
    /// 3. `config/<HEARTH_ENV>.yaml` - Environment-specific overrides.
    /// 4. `HEARTH_*` environment variables (`__` separates nesting levels).
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(HearthConfig::default()));

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        }

        let env = std::env::var("HEARTH_ENV").unwrap_or_else(|_| "local".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific path, layered over defaults and under
    /// `HEARTH_*` environment variables.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment = Figment::from(Serialized::defaults(HearthConfig::default()))
            .merge(Yaml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed("HEARTH_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
