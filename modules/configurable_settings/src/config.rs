//! Configuration for the configurable settings module

use crate::domain::validation::{Limits, DEFAULT_MAX_VALUE_LENGTH};
use anyhow::Context;
use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `CONFIGURABLE_SETTINGS_MAX_VALUE_LENGTH`
pub const ENV_PREFIX: &str = "CONFIGURABLE_SETTINGS_";

/// Configurable settings configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Schema documents (YAML or JSON) registered at startup
    #[serde(default)]
    pub schema_files: Vec<PathBuf>,

    /// Maximum stored value size in bytes
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_files: Vec::new(),
            max_value_length: default_max_value_length(),
        }
    }
}

impl Config {
    /// Load from an optional YAML file, then from `CONFIGURABLE_SETTINGS_*` variables
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with_env(path, ENV_PREFIX)
    }

    /// Same as `load` with variables read under `prefix`; variables win over the file
    pub fn load_with_env(path: Option<&Path>, prefix: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(prefix))
            .extract()
            .context("Failed to load configurable settings configuration")
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_value_length: self.max_value_length,
        }
    }
}

fn default_max_value_length() -> usize {
    DEFAULT_MAX_VALUE_LENGTH
}
