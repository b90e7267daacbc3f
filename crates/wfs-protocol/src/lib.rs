//! OGC Web Feature Service (WFS) 2.0 GetFeature protocol.
//!
//! This crate holds the request-independent half of a GetFeature response:
//! - [`filter`]: the validated request filter and output format
//! - [`query`]: translation of a filter into parameterized SQL
//! - [`feature`]: feature rows as read from the data source, and their
//!   viewer-URL decoration
//! - [`geojson`] and [`gml`]: the two response encodings
//! - [`exceptions`]: OWS exception reports for failed requests
//!
//! # Example
//!
//! ```rust
//! use wfs_protocol::{FeatureQueryFilter, OutputFormat, QueryBuilder};
//!
//! let filter = FeatureQueryFilter::new(vec!["parks".to_string()])
//!     .unwrap()
//!     .with_count(5)
//!     .with_output_format(OutputFormat::Gml);
//!
//! let plan = QueryBuilder::new("features").unwrap().build(&filter);
//! assert!(plan.fetch.sql.contains("LIMIT"));
//! assert!(plan.total_count.is_some());
//! ```

pub mod exceptions;
pub mod feature;
pub mod filter;
pub mod geojson;
pub mod gml;
pub mod query;

#[cfg(test)]
mod test_fixtures;

pub use exceptions::ExceptionReport;
pub use feature::{decorate, DecoratedFeature, FeatureRow, FeatureValue};
pub use filter::{FeatureQueryFilter, OutputFormat};
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use gml::{GmlFeatureCollection, PointEncoding};
pub use query::{FeatureQuery, QueryBuilder, QueryParam, QueryPlan, SqlValue};

/// XML namespaces used in WFS 2.0 responses.
pub mod namespaces {
    /// WFS 2.0 namespace
    pub const WFS: &str = "http://www.opengis.net/wfs/2.0";
    /// GML 3.2 namespace
    pub const GML: &str = "http://www.opengis.net/gml/3.2";
    /// XML Schema instance namespace
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    /// OWS 1.1 namespace (exception reports)
    pub const OWS: &str = "http://www.opengis.net/ows/1.1";
}

/// Media types used in WFS responses.
pub mod media_types {
    /// GeoJSON responses are served as plain JSON
    pub const JSON: &str = "application/json";
    /// GML responses and exception reports
    pub const XML: &str = "text/xml";
}
