//! WFS API Service Library
//!
//! HTTP server answering OGC WFS 2.0 `GetFeature` requests against a local
//! SQLite / GeoPackage feature database, in GML 3.2 or GeoJSON.

pub mod base_url;
pub mod config;
pub mod handlers;
pub mod params;
pub mod state;

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // WFS
        .route("/wfs", get(handlers::wfs::wfs_handler))
        .route("/wfs/", get(handlers::wfs::wfs_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
