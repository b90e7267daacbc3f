//! SQLite databases holding the sample features.

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tempfile::TempDir;

use crate::fixtures::{sample_features, SampleFeature, SAMPLE_GEOM};

/// Storage table plus the unified `features` view the service reads.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE feature_rows (
    id INTEGER NOT NULL,
    featureset TEXT NOT NULL,
    name TEXT,
    x REAL NOT NULL,
    y REAL NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    elevation REAL,
    geom BLOB,
    PRIMARY KEY (featureset, id)
);

CREATE VIEW features AS
SELECT id, featureset, name, x, y, latitude, longitude, elevation, geom
FROM feature_rows;
"#;

/// Create the schema and insert `features`.
pub async fn seed(pool: &SqlitePool, features: &[SampleFeature]) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_SQL.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    for feature in features {
        sqlx::query(
            "INSERT INTO feature_rows \
             (id, featureset, name, x, y, latitude, longitude, elevation, geom) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(feature.id)
        .bind(feature.featureset)
        .bind(&feature.name)
        .bind(feature.x)
        .bind(feature.y)
        .bind(feature.latitude)
        .bind(feature.longitude)
        .bind(feature.elevation)
        .bind(SAMPLE_GEOM.to_vec())
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Empty in-memory database on a single connection.
///
/// Each in-memory connection owns its own database, so the pool never
/// opens a second one nor recycles the first.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

/// In-memory database holding every sample feature.
pub async fn seeded_pool() -> SqlitePool {
    let pool = memory_pool().await;
    seed(&pool, &sample_features())
        .await
        .expect("seed sample features");
    pool
}

/// Write a database file at `path` holding `features`.
pub async fn create_feature_file(
    path: &Path,
    features: &[SampleFeature],
) -> Result<(), sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    seed(&pool, features).await?;
    pool.close().await;
    Ok(())
}

/// A temporary `features.gpkg` holding every sample feature.
///
/// Keep the returned directory alive for as long as the file is used.
pub async fn seeded_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("features.gpkg");
    create_feature_file(&path, &sample_features())
        .await
        .expect("seed feature file");
    (dir, path)
}
