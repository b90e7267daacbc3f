//! GetFeature request filter.

use serde::{Deserialize, Serialize};
use wfs_common::{BoundingBox, CrsCode, WfsError, WfsResult};

use crate::media_types;

/// Response encoding for GetFeature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// GeoJSON FeatureCollection
    GeoJson,
    /// WFS 2.0 FeatureCollection with GML 3.2 geometries (WFS default)
    #[default]
    Gml,
}

impl OutputFormat {
    /// Parse an `OUTPUTFORMAT` value.
    pub fn from_kvp(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "application/json" | "json" | "geojson" | "application/geo+json" => {
                Some(OutputFormat::GeoJson)
            }
            "text/xml" | "application/xml" | "gml" | "gml3" | "gml32" | "application/gml+xml" => {
                Some(OutputFormat::Gml)
            }
            other
                if other.starts_with("text/xml;") || other.starts_with("application/gml+xml;") =>
            {
                Some(OutputFormat::Gml)
            }
            _ => None,
        }
    }

    /// Get the Content-Type header value for this format.
    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::GeoJson => media_types::JSON,
            OutputFormat::Gml => media_types::XML,
        }
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::GeoJson => "geojson",
            OutputFormat::Gml => "gml",
        }
    }
}

/// A validated GetFeature filter, built once per request.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQueryFilter {
    type_names: Vec<String>,
    bbox: Option<BoundingBox>,
    count: Option<u32>,
    output_format: OutputFormat,
    srs_name: Option<CrsCode>,
}

impl FeatureQueryFilter {
    /// Create a filter over the given feature types.
    ///
    /// Fails when `type_names` is empty, since an empty `IN ()` list is not
    /// a query any data source accepts.
    pub fn new(type_names: Vec<String>) -> WfsResult<Self> {
        if type_names.is_empty() {
            return Err(WfsError::MissingParameter("typeNames".to_string()));
        }
        Ok(Self {
            type_names,
            bbox: None,
            count: None,
            output_format: OutputFormat::default(),
            srs_name: None,
        })
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Limit the number of returned rows. A zero count is ignored.
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = (count > 0).then_some(count);
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn with_srs_name(mut self, srs_name: CrsCode) -> Self {
        self.srs_name = Some(srs_name);
        self
    }

    pub fn type_names(&self) -> &[String] {
        &self.type_names
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    pub fn count(&self) -> Option<u32> {
        self.count
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// The requested CRS, `None` meaning the EPSG:3857 default.
    pub fn srs_name(&self) -> Option<CrsCode> {
        self.srs_name
    }
}
