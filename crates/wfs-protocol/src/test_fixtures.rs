//! Row builders for unit tests in this crate.

use crate::feature::{FeatureRow, FeatureValue};

/// Columns of a `parks` row, in the order the store would return them.
pub fn park_columns(id: i64, x: f64, y: f64) -> Vec<(String, FeatureValue)> {
    vec![
        ("id".to_string(), FeatureValue::Integer(id)),
        ("featureset".to_string(), FeatureValue::from("parks")),
        ("name".to_string(), FeatureValue::Text(format!("Park {}", id))),
        ("x".to_string(), FeatureValue::Real(x)),
        ("y".to_string(), FeatureValue::Real(y)),
        ("latitude".to_string(), FeatureValue::Real(47.5 + id as f64 / 100.0)),
        ("longitude".to_string(), FeatureValue::Real(8.25 + id as f64 / 100.0)),
        ("area".to_string(), FeatureValue::Real(12.5)),
        ("geom".to_string(), FeatureValue::Blob(vec![0x47, 0x50])),
    ]
}

pub fn park_row(id: i64, x: f64, y: f64) -> FeatureRow {
    FeatureRow::from_columns(park_columns(id, x, y)).expect("fixture row is complete")
}
