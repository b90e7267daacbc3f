//! WFS service configuration loaded from YAML.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Service settings that are not per-request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfsConfig {
    /// Table or view holding the unified feature rows.
    #[serde(default = "default_feature_view")]
    pub feature_view: String,

    /// Columns left out of GML output.
    #[serde(default = "default_excluded_columns")]
    pub excluded_columns: Vec<String>,

    /// Externally visible base URL (e.g. behind a proxy). Derived from the
    /// request when unset.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Upper bound applied to `COUNT`.
    #[serde(default)]
    pub max_count: Option<u32>,

    /// SQLite pool size.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_feature_view() -> String {
    "features".to_string()
}

fn default_excluded_columns() -> Vec<String> {
    vec!["id".to_string(), "featureset".to_string()]
}

fn default_max_connections() -> u32 {
    feature_store::DEFAULT_MAX_CONNECTIONS
}

impl Default for WfsConfig {
    fn default() -> Self {
        Self {
            feature_view: default_feature_view(),
            excluded_columns: default_excluded_columns(),
            public_url: None,
            max_count: None,
            max_connections: default_max_connections(),
        }
    }
}

impl WfsConfig {
    /// Load from a YAML file, or use defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            tracing::info!("No WFS config file given, using defaults");
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!(
            path = ?path,
            feature_view = %config.feature_view,
            "Loaded WFS config"
        );
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn excluded_set(&self) -> HashSet<String> {
        self.excluded_columns.iter().cloned().collect()
    }
}
