//! Sample features used across the workspace tests.
//!
//! Twelve parks laid out on a diagonal (`x = 1000 * id`, `y = 500 * id`)
//! and three trails in the negative quadrant, so bbox and count scenarios
//! have predictable answers.

use wfs_protocol::{FeatureRow, FeatureValue};

pub const PARKS: &str = "parks";
pub const TRAILS: &str = "trails";

pub const PARK_COUNT: usize = 12;
pub const TRAIL_COUNT: usize = 3;

/// Opaque geometry payload stored in the `geom` column.
pub const SAMPLE_GEOM: [u8; 4] = [0x47, 0x50, 0x00, 0x01];

/// One row of the sample `features` view.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFeature {
    pub featureset: &'static str,
    pub id: i64,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Null for every even park id.
    pub elevation: Option<f64>,
}

impl SampleFeature {
    pub fn park(id: i64) -> Self {
        Self {
            featureset: PARKS,
            id,
            name: format!("Park {}", id),
            x: 1000.0 * id as f64,
            y: 500.0 * id as f64,
            latitude: 40.0 + id as f64 / 100.0,
            longitude: -105.0 + id as f64 / 100.0,
            elevation: (id % 2 == 1).then(|| 1600.0 + id as f64),
        }
    }

    pub fn trail(id: i64) -> Self {
        Self {
            featureset: TRAILS,
            id,
            name: format!("Trail {}", id),
            x: -1000.0 * id as f64,
            y: -500.0 * id as f64,
            latitude: 39.0 - id as f64 / 100.0,
            longitude: -106.0 - id as f64 / 100.0,
            elevation: Some(2500.0 + id as f64),
        }
    }

    /// Columns in the order the `features` view returns them.
    pub fn columns(&self) -> Vec<(String, FeatureValue)> {
        vec![
            ("id".to_string(), FeatureValue::Integer(self.id)),
            ("featureset".to_string(), FeatureValue::from(self.featureset)),
            ("name".to_string(), FeatureValue::Text(self.name.clone())),
            ("x".to_string(), FeatureValue::Real(self.x)),
            ("y".to_string(), FeatureValue::Real(self.y)),
            ("latitude".to_string(), FeatureValue::Real(self.latitude)),
            ("longitude".to_string(), FeatureValue::Real(self.longitude)),
            (
                "elevation".to_string(),
                self.elevation.map_or(FeatureValue::Null, FeatureValue::Real),
            ),
            ("geom".to_string(), FeatureValue::Blob(SAMPLE_GEOM.to_vec())),
        ]
    }

    pub fn to_row(&self) -> FeatureRow {
        FeatureRow::from_columns(self.columns()).expect("sample feature has every column")
    }
}

/// Every sample feature: parks first, then trails.
pub fn sample_features() -> Vec<SampleFeature> {
    (1..=PARK_COUNT as i64)
        .map(SampleFeature::park)
        .chain((1..=TRAIL_COUNT as i64).map(SampleFeature::trail))
        .collect()
}

pub fn sample_rows() -> Vec<FeatureRow> {
    sample_features().iter().map(SampleFeature::to_row).collect()
}

/// Sample rows of a single featureset.
pub fn rows_in(featureset: &str) -> Vec<FeatureRow> {
    sample_rows()
        .into_iter()
        .filter(|row| row.featureset == featureset)
        .collect()
}
