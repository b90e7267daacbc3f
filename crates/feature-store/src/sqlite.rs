//! SQLite / GeoPackage feature store.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use wfs_common::{WfsError, WfsResult};
use wfs_protocol::{FeatureQuery, FeatureRow, FeatureValue, SqlValue};

use crate::source::FeatureStore;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Feature store backed by a read-only SQLite pool.
///
/// The pool is swapped on refresh. Readers clone the current pool handle
/// up front, so a query in flight finishes on the pool it started with.
pub struct SqliteFeatureStore {
    path: Option<PathBuf>,
    max_connections: u32,
    state: RwLock<PoolState>,
}

struct PoolState {
    pool: SqlitePool,
    /// Modification time of the file when `pool` was opened.
    modified: Option<SystemTime>,
}

impl SqliteFeatureStore {
    /// Open a database file read-only.
    pub async fn open(path: impl AsRef<Path>, max_connections: u32) -> WfsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let modified = file_modified(&path).await?;
        let pool = connect(&path, max_connections).await?;

        info!(path = %path.display(), max_connections, "Opened feature database");

        Ok(Self {
            path: Some(path),
            max_connections,
            state: RwLock::new(PoolState {
                pool,
                modified: Some(modified),
            }),
        })
    }

    /// Wrap an existing pool. There is no backing file, so refresh does nothing.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            path: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            state: RwLock::new(PoolState {
                pool,
                modified: None,
            }),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn pool(&self) -> SqlitePool {
        self.state.read().await.pool.clone()
    }
}

#[async_trait]
impl FeatureStore for SqliteFeatureStore {
    #[instrument(skip(self))]
    async fn refresh(&self, force_full: bool) -> WfsResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let modified = file_modified(path).await?;
        let current = self.state.read().await.modified;
        if !force_full && current == Some(modified) {
            return Ok(());
        }

        let pool = connect(path, self.max_connections).await?;

        let mut state = self.state.write().await;
        if !force_full && state.modified == Some(modified) {
            // A concurrent refresh already swapped in this generation.
            return Ok(());
        }
        state.pool = pool;
        state.modified = Some(modified);

        info!(path = %path.display(), force_full, "Reloaded feature database");
        Ok(())
    }

    async fn query_feature_package(&self, query: &FeatureQuery) -> WfsResult<Vec<FeatureRow>> {
        debug!(sql = %query.sql, params = %describe_params(query), "Fetching features");

        let pool = self.pool().await;
        let rows = bind_params(query)
            .fetch_all(&pool)
            .await
            .map_err(query_error)?;

        rows.iter().map(decode_row).collect()
    }

    async fn count_features(&self, query: &FeatureQuery) -> WfsResult<u64> {
        debug!(sql = %query.sql, params = %describe_params(query), "Counting features");

        let pool = self.pool().await;
        let row = bind_params(query)
            .fetch_one(&pool)
            .await
            .map_err(query_error)?;
        let total: i64 = row.try_get(0).map_err(query_error)?;

        u64::try_from(total)
            .map_err(|_| WfsError::DataSource(format!("Count query returned {}", total)))
    }

    async fn ping(&self) -> WfsResult<()> {
        let pool = self.pool().await;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(query_error)?;
        Ok(())
    }
}

async fn connect(path: &Path, max_connections: u32) -> WfsResult<SqlitePool> {
    let options = SqliteConnectOptions::new().filename(path).read_only(true);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            WfsError::DataSource(format!("Failed to open {}: {}", path.display(), e))
        })
}

async fn file_modified(path: &Path) -> WfsResult<SystemTime> {
    tokio::fs::metadata(path)
        .await
        .and_then(|meta| meta.modified())
        .map_err(|e| WfsError::DataSource(format!("Cannot stat {}: {}", path.display(), e)))
}

fn bind_params(query: &FeatureQuery) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    query
        .params
        .iter()
        .fold(sqlx::query(&query.sql), |q, param| match &param.value {
            SqlValue::Text(s) => q.bind(s.as_str()),
            SqlValue::Real(v) => q.bind(*v),
            SqlValue::Integer(v) => q.bind(*v),
        })
}

fn describe_params(query: &FeatureQuery) -> String {
    query
        .params
        .iter()
        .map(|p| format!("{}={}", p.name, p.value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn query_error(e: sqlx::Error) -> WfsError {
    WfsError::DataSource(e.to_string())
}

fn decode_row(row: &SqliteRow) -> WfsResult<FeatureRow> {
    let cols = row
        .columns()
        .iter()
        .map(|column| Ok((column.name().to_string(), decode_value(row, column.ordinal())?)))
        .collect::<WfsResult<Vec<_>>>()?;

    FeatureRow::from_columns(cols)
}

/// Decode by the value's storage class rather than the declared column type;
/// views and GeoPackage tables often declare loose or no types.
fn decode_value(row: &SqliteRow, index: usize) -> WfsResult<FeatureValue> {
    let raw = row.try_get_raw(index).map_err(query_error)?;
    if raw.is_null() {
        return Ok(FeatureValue::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" => FeatureValue::Integer(row.try_get_unchecked(index).map_err(query_error)?),
        "REAL" => FeatureValue::Real(row.try_get_unchecked(index).map_err(query_error)?),
        "BLOB" => FeatureValue::Blob(row.try_get_unchecked(index).map_err(query_error)?),
        _ => FeatureValue::Text(row.try_get_unchecked(index).map_err(query_error)?),
    };
    Ok(value)
}
