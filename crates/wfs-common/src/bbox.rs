//! Bounding box types and KVP parsing.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in the coordinate units of the feature view.
///
/// GetFeature filters compare these bounds against the projected `x`/`y`
/// columns, so for the default dataset they are EPSG:3857 meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a WFS BBOX parameter: `minx,miny,maxx,maxy[,crs]`.
    ///
    /// Returns the box and the optional trailing CRS item, untouched.
    pub fn from_kvp_string(s: &str) -> Result<(Self, Option<String>), BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 && parts.len() != 5 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let mut coords = [0.0_f64; 4];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))?;
        }

        let [min_x, min_y, max_x, max_y] = coords;
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(BboxParseError::InvalidNumber(s.to_string()));
        }
        if min_x > max_x || min_y > max_y {
            return Err(BboxParseError::InvertedExtent(s.to_string()));
        }

        let crs = parts.get(4).map(|c| c.to_string());
        Ok((Self::new(min_x, min_y, max_x, max_y), crs))
    }

    /// Bounds in `(xmin, ymin, xmax, ymax)` order.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy[,crs]'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),

    #[error("BBOX minimum exceeds maximum: {0}")]
    InvertedExtent(String),
}
