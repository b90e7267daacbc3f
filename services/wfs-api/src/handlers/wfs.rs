//! WFS GetFeature handler.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::HeaderMap,
    response::Response,
};
use metrics::{counter, histogram};
use tracing::{debug, info_span, Instrument};
use wfs_common::{WfsError, WfsResult};
use wfs_protocol::{
    decorate, DecoratedFeature, FeatureCollection, FeatureQueryFilter, GmlFeatureCollection,
    OutputFormat,
};

use super::common::{document, ows_exception};
use crate::base_url::server_base_url;
use crate::params::{resolve_filter, WfsParams};
use crate::state::AppState;

/// GET /wfs - GetFeature
pub async fn wfs_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    params: Result<Query<WfsParams>, QueryRejection>,
) -> Response {
    let start = Instant::now();

    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => {
            counter!("wfs_getfeature_errors_total", "kind" => "request").increment(1);
            return ows_exception(&WfsError::invalid("query", rejection.body_text()));
        }
    };

    let filter = match resolve_filter(&params, state.config.max_count) {
        Ok(filter) => filter,
        Err(response) => {
            counter!("wfs_getfeature_errors_total", "kind" => "request").increment(1);
            return response;
        }
    };

    let format = filter.output_format();
    counter!("wfs_getfeature_requests_total", "format" => format.label()).increment(1);

    let base_url = server_base_url(
        &headers,
        state.config.public_url.as_deref(),
        &state.listen_addr,
    );
    let span = info_span!(
        "get_feature",
        type_names = %filter.type_names().join(","),
        format = format.label(),
        count = ?filter.count(),
    );

    let result = get_feature(&state, &filter, &base_url).instrument(span).await;
    histogram!("wfs_getfeature_duration_seconds").record(start.elapsed().as_secs_f64());

    match result {
        Ok(body) => document(format.content_type(), body),
        Err(e) => {
            counter!("wfs_getfeature_errors_total", "kind" => e.kind()).increment(1);
            ows_exception(&e)
        }
    }
}

async fn get_feature(
    state: &AppState,
    filter: &FeatureQueryFilter,
    base_url: &str,
) -> WfsResult<String> {
    state.store.refresh(false).await?;

    let plan = state.query_builder.build(filter);
    let rows = state.store.query_feature_package(&plan.fetch).await?;

    // Without a limit the fetched rows are every match.
    let number_matched = match &plan.total_count {
        Some(total_query) => state.store.count_features(total_query).await?,
        None => rows.len() as u64,
    };

    let features: Vec<DecoratedFeature> =
        rows.into_iter().map(|row| decorate(base_url, row)).collect();

    histogram!("wfs_features_returned").record(features.len() as f64);
    debug!(
        returned = features.len(),
        matched = number_matched,
        "Fetched features"
    );

    match filter.output_format() {
        OutputFormat::GeoJson => {
            FeatureCollection::from_features(&features, filter.srs_name()).to_json_pretty()
        }
        OutputFormat::Gml => GmlFeatureCollection::new(
            &features,
            number_matched,
            filter.srs_name(),
            &state.excluded_columns,
        )?
        .to_xml(),
    }
}
