//! GetFeature KVP parameter resolution.

use axum::response::Response;
use serde::Deserialize;
use wfs_common::{BoundingBox, CrsCode, WfsError, WfsResult};
use wfs_protocol::gml::is_ncname;
use wfs_protocol::{FeatureQueryFilter, OutputFormat};

use crate::handlers::common::ows_exception;

/// Raw GetFeature query parameters. Everything is kept as text so that bad
/// values surface as OWS exceptions rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct WfsParams {
    #[serde(rename = "SERVICE", alias = "service")]
    pub service: Option<String>,
    #[serde(rename = "VERSION", alias = "version")]
    pub version: Option<String>,
    #[serde(rename = "REQUEST", alias = "request")]
    pub request: Option<String>,
    #[serde(
        rename = "TYPENAMES",
        alias = "typenames",
        alias = "typeNames",
        alias = "TYPENAME",
        alias = "typename",
        alias = "typeName"
    )]
    pub type_names: Option<String>,
    #[serde(rename = "BBOX", alias = "bbox")]
    pub bbox: Option<String>,
    #[serde(
        rename = "COUNT",
        alias = "count",
        alias = "MAXFEATURES",
        alias = "maxfeatures",
        alias = "maxFeatures"
    )]
    pub count: Option<String>,
    #[serde(rename = "OUTPUTFORMAT", alias = "outputformat", alias = "outputFormat")]
    pub output_format: Option<String>,
    #[serde(rename = "SRSNAME", alias = "srsname", alias = "srsName")]
    pub srs_name: Option<String>,
}

impl WfsParams {
    /// Validate the parameters into a filter.
    ///
    /// `max_count` silently caps `COUNT` when set.
    pub fn to_filter(&self, max_count: Option<u32>) -> WfsResult<FeatureQueryFilter> {
        if let Some(service) = present(&self.service) {
            if !service.eq_ignore_ascii_case("WFS") {
                return Err(WfsError::invalid(
                    "service",
                    format!("expected WFS, got '{}'", service),
                ));
            }
        }

        if let Some(request) = present(&self.request) {
            if !request.eq_ignore_ascii_case("GetFeature") {
                return Err(WfsError::OperationNotSupported(request.to_string()));
            }
        }

        let type_names = parse_type_names(present(&self.type_names).unwrap_or(""))?;
        let mut filter = FeatureQueryFilter::new(type_names)?;

        if let Some(bbox) = present(&self.bbox) {
            filter = filter.with_bbox(parse_bbox(bbox)?);
        }

        if let Some(count) = present(&self.count) {
            let count = parse_count(count)?;
            filter = filter.with_count(max_count.map_or(count, |max| count.min(max)));
        }

        if let Some(format) = present(&self.output_format) {
            let format = OutputFormat::from_kvp(format).ok_or_else(|| {
                WfsError::invalid("outputFormat", format!("unsupported format '{}'", format))
            })?;
            filter = filter.with_output_format(format);
        }

        if let Some(srs_name) = present(&self.srs_name) {
            filter = filter.with_srs_name(parse_crs("srsName", srs_name)?);
        }

        Ok(filter)
    }
}

/// Resolve parameters into a filter, or into the error response to send.
pub fn resolve_filter(
    params: &WfsParams,
    max_count: Option<u32>,
) -> Result<FeatureQueryFilter, Response> {
    params.to_filter(max_count).map_err(|e| {
        tracing::debug!(error = %e, "Rejected GetFeature parameters");
        ows_exception(&e)
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_type_names(value: &str) -> WfsResult<Vec<String>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let local = match name.split_once(':') {
                Some((prefix, local)) if is_ncname(prefix) => local,
                _ => name,
            };
            if is_ncname(local) {
                Ok(local.to_string())
            } else {
                Err(WfsError::invalid(
                    "typeNames",
                    format!("'{}' is not a valid feature type name", name),
                ))
            }
        })
        .collect()
}

fn parse_bbox(value: &str) -> WfsResult<BoundingBox> {
    let (bbox, crs) =
        BoundingBox::from_kvp_string(value).map_err(|e| WfsError::invalid("bbox", e.to_string()))?;
    if let Some(crs) = crs {
        parse_crs("bbox", &crs)?;
    }
    Ok(bbox)
}

fn parse_count(value: &str) -> WfsResult<u32> {
    match value.parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(WfsError::invalid(
            "count",
            format!("expected a positive integer, got '{}'", value),
        )),
    }
}

fn parse_crs(param: &str, value: &str) -> WfsResult<CrsCode> {
    CrsCode::from_wfs_string(value).map_err(|e| WfsError::invalid(param, e.to_string()))
}
