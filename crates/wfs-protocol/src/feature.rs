//! Feature rows and their decoration.
//!
//! Feature schemas vary per dataset, so a row is a handful of required,
//! typed columns plus an open list of attribute columns kept in query order.

use std::fmt;

use wfs_common::{WfsError, WfsResult};

/// Column names every feature row must carry.
pub mod columns {
    pub const ID: &str = "id";
    pub const FEATURESET: &str = "featureset";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const LATITUDE: &str = "latitude";
    pub const LONGITUDE: &str = "longitude";
    pub const GEOM: &str = "geom";
    /// Added by [`decorate`](super::decorate), never read from the store.
    pub const VIEWER_URL: &str = "viewerUrl";
}

/// A single scalar value read from the data source.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl FeatureValue {
    /// Numeric view of the value. Text is parsed when it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Integer(v) => Some(*v as f64),
            FeatureValue::Real(v) => Some(*v),
            FeatureValue::Text(s) => s.trim().parse().ok(),
            FeatureValue::Null | FeatureValue::Blob(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FeatureValue::Null)
    }
}

/// String coercion used for every output property.
impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Null => Ok(()),
            FeatureValue::Integer(v) => write!(f, "{}", v),
            FeatureValue::Real(v) => write!(f, "{}", v),
            FeatureValue::Text(s) => f.write_str(s),
            FeatureValue::Blob(bytes) => bytes.iter().try_for_each(|b| write!(f, "{:02x}", b)),
        }
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Text(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Text(s)
    }
}

impl From<i64> for FeatureValue {
    fn from(v: i64) -> Self {
        FeatureValue::Integer(v)
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        FeatureValue::Real(v)
    }
}

/// One row of the unified feature view.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Unique within its featureset.
    pub id: FeatureValue,
    /// Source collection the row belongs to.
    pub featureset: String,
    /// Projected (EPSG:3857) easting.
    pub x: f64,
    /// Projected (EPSG:3857) northing.
    pub y: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Opaque geometry payload; replaced by a structured geometry on output.
    pub geom: FeatureValue,
    /// Remaining columns in query order.
    pub attributes: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    /// Lift the required columns out of a decoded row.
    ///
    /// Fails when a required column is absent, when `id` or `featureset` is
    /// null, or when a coordinate column is not numeric.
    pub fn from_columns(cols: Vec<(String, FeatureValue)>) -> WfsResult<Self> {
        let mut id = None;
        let mut featureset = None;
        let mut x = None;
        let mut y = None;
        let mut latitude = None;
        let mut longitude = None;
        let mut geom = None;
        let mut attributes = Vec::with_capacity(cols.len().saturating_sub(7));

        for (name, value) in cols {
            let slot = match name.as_str() {
                columns::ID => &mut id,
                columns::FEATURESET => &mut featureset,
                columns::X => &mut x,
                columns::Y => &mut y,
                columns::LATITUDE => &mut latitude,
                columns::LONGITUDE => &mut longitude,
                columns::GEOM => &mut geom,
                _ => {
                    attributes.push((name, value));
                    continue;
                }
            };
            *slot = Some(value);
        }

        let id = required(id, columns::ID)?;
        if id.is_null() {
            return Err(WfsError::DataSource("feature id is null".to_string()));
        }
        let featureset = required(featureset, columns::FEATURESET)?;
        if featureset.is_null() {
            return Err(WfsError::DataSource(format!(
                "featureset is null for feature {}",
                id
            )));
        }

        Ok(Self {
            x: numeric(required(x, columns::X)?, columns::X, &id)?,
            y: numeric(required(y, columns::Y)?, columns::Y, &id)?,
            latitude: numeric(required(latitude, columns::LATITUDE)?, columns::LATITUDE, &id)?,
            longitude: numeric(
                required(longitude, columns::LONGITUDE)?,
                columns::LONGITUDE,
                &id,
            )?,
            geom: required(geom, columns::GEOM)?,
            featureset: featureset.to_string(),
            id,
            attributes,
        })
    }

    /// Reserved identifier `Point.<id>`.
    pub fn gml_id(&self) -> String {
        format!("Point.{}", self.id)
    }

    /// Every column except `geom`, coerced to strings, in output order.
    pub fn properties(&self) -> Vec<(&str, String)> {
        let mut props = Vec::with_capacity(6 + self.attributes.len());
        props.push((columns::ID, self.id.to_string()));
        props.push((columns::FEATURESET, self.featureset.clone()));
        props.push((columns::X, self.x.to_string()));
        props.push((columns::Y, self.y.to_string()));
        props.push((columns::LATITUDE, self.latitude.to_string()));
        props.push((columns::LONGITUDE, self.longitude.to_string()));
        props.extend(
            self.attributes
                .iter()
                .map(|(name, value)| (name.as_str(), value.to_string())),
        );
        props
    }
}

fn required(value: Option<FeatureValue>, column: &str) -> WfsResult<FeatureValue> {
    value.ok_or_else(|| WfsError::MissingColumn(column.to_string()))
}

fn numeric(value: FeatureValue, column: &str, id: &FeatureValue) -> WfsResult<f64> {
    value.as_f64().ok_or_else(|| {
        WfsError::DataSource(format!(
            "column '{}' of feature {} is not numeric",
            column, id
        ))
    })
}

/// A feature row with its derived viewer URL.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedFeature {
    pub viewer_url: String,
    pub row: FeatureRow,
}

impl DecoratedFeature {
    /// Output properties: `viewerUrl` first, then the row's own properties.
    ///
    /// A row attribute named `viewerUrl` keeps the first position but
    /// replaces the derived value.
    pub fn properties(&self) -> Vec<(&str, String)> {
        let mut props = self.row.properties();
        let own_idx = props
            .iter()
            .position(|(name, _)| *name == columns::VIEWER_URL);
        let own = own_idx.map(|idx| props.remove(idx).1);
        props.insert(
            0,
            (
                columns::VIEWER_URL,
                own.unwrap_or_else(|| self.viewer_url.clone()),
            ),
        );
        props
    }
}

/// Attach the viewer URL for a row.
///
/// `viewerUrl = <serverBaseUrl>/viewer#camera=<latitude>,<longitude>,18.00z`
pub fn decorate(server_base_url: &str, row: FeatureRow) -> DecoratedFeature {
    let viewer_url = format!(
        "{}/viewer#camera={},{},18.00z",
        server_base_url.trim_end_matches('/'),
        row.latitude,
        row.longitude
    );
    DecoratedFeature { viewer_url, row }
}
