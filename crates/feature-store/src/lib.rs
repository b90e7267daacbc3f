//! Feature data sources for the WFS service.
//!
//! A [`FeatureStore`] runs the queries produced by
//! [`wfs_protocol::QueryBuilder`] and hands back [`wfs_protocol::FeatureRow`]s.
//! [`SqliteFeatureStore`] reads a local SQLite or GeoPackage file.

mod source;
mod sqlite;

pub use source::FeatureStore;
pub use sqlite::{SqliteFeatureStore, DEFAULT_MAX_CONNECTIONS};
