//! Application state for the WFS API.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use feature_store::{FeatureStore, SqliteFeatureStore};
use metrics_exporter_prometheus::PrometheusHandle;
use wfs_protocol::QueryBuilder;

use crate::config::WfsConfig;

/// Shared application state.
pub struct AppState {
    /// Data source for feature rows.
    pub store: Arc<dyn FeatureStore>,

    /// Query builder bound to the configured feature view.
    pub query_builder: QueryBuilder,

    pub config: WfsConfig,

    /// `config.excluded_columns` as a set, for GML encoding.
    pub excluded_columns: HashSet<String>,

    /// Host used for viewer URLs when the request carries none.
    pub listen_addr: String,

    /// Renders `/metrics`; absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Open the feature database and build the state around it.
    pub async fn new(database: &Path, config: WfsConfig, listen_addr: String) -> Result<Self> {
        let store = SqliteFeatureStore::open(database, config.max_connections).await?;
        Self::with_store(Arc::new(store), config, listen_addr)
    }

    /// Build the state around an existing store.
    pub fn with_store(
        store: Arc<dyn FeatureStore>,
        config: WfsConfig,
        listen_addr: String,
    ) -> Result<Self> {
        let query_builder = QueryBuilder::new(config.feature_view.clone())?;

        Ok(Self {
            store,
            query_builder,
            excluded_columns: config.excluded_set(),
            config,
            listen_addr,
            prometheus: None,
        })
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
