//! GeoJSON encoding of GetFeature results.
//!
//! Point coordinates are `[x, y]` (projected) unless EPSG:4326 was
//! requested, in which case they are `[longitude, latitude]`. No other CRS
//! changes the output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wfs_common::{CrsCode, WfsResult};

use crate::feature::{columns, DecoratedFeature};

/// Property carrying the reserved `Point.<id>` identifier.
pub const GML_ID_PROPERTY: &str = "GmlID";

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Encode decorated features, choosing the coordinate pair by CRS.
    pub fn from_features(features: &[DecoratedFeature], srs_name: Option<CrsCode>) -> Self {
        Self {
            features: features
                .iter()
                .map(|f| Feature::from_decorated(f, srs_name))
                .collect(),
            ..Self::new()
        }
    }

    /// Indented JSON text.
    pub fn to_json_pretty(&self) -> WfsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    pub geometry: Geometry,

    /// `GmlID` first, then every column but `geom` as strings, in row order.
    /// A row column named `GmlID` is dropped.
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn from_decorated(feature: &DecoratedFeature, srs_name: Option<CrsCode>) -> Self {
        let row = &feature.row;

        let mut properties = Map::new();
        properties.insert(GML_ID_PROPERTY.to_string(), Value::String(row.gml_id()));
        for (name, value) in feature.properties() {
            if name != columns::GEOM && name != GML_ID_PROPERTY {
                properties.insert(name.to_string(), Value::String(value));
            }
        }

        let geometry = match srs_name {
            Some(CrsCode::Epsg4326) => Geometry::point(row.longitude, row.latitude),
            _ => Geometry::point(row.x, row.y),
        };

        Self {
            type_: "Feature".to_string(),
            geometry,
            properties,
        }
    }
}

/// GeoJSON geometry. Features are always points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

impl Geometry {
    pub fn point(first: f64, second: f64) -> Self {
        Geometry::Point {
            coordinates: [first, second],
        }
    }
}
