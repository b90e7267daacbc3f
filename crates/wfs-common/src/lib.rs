//! Common types and utilities shared across the WFS services.

pub mod bbox;
pub mod crs;
pub mod error;

pub use bbox::{BboxParseError, BoundingBox};
pub use crs::{CrsCode, CrsParseError};
pub use error::{WfsError, WfsResult};
