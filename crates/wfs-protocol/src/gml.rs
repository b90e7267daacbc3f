//! WFS 2.0 / GML 3.2 encoding of GetFeature results.
//!
//! The whole document is built in memory. The point encoding is resolved
//! before the first byte is written, so an unsupported CRS fails the request
//! without producing a partial document.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use wfs_common::{CrsCode, WfsError, WfsResult};

use crate::feature::{columns, DecoratedFeature, FeatureRow};
use crate::namespaces;

/// How a feature's point is placed in `gml:pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointEncoding {
    /// EPSG:3857, `"<x> <y>"`
    WebMercator,
    /// EPSG:4326, `"<latitude> <longitude>"` (EPSG axis order)
    Geographic,
}

impl PointEncoding {
    /// Pick the encoding for a requested CRS; `None` means EPSG:3857.
    pub fn for_crs(srs_name: Option<CrsCode>) -> WfsResult<Self> {
        match srs_name {
            None | Some(CrsCode::Epsg3857) => Ok(PointEncoding::WebMercator),
            Some(CrsCode::Epsg4326) => Ok(PointEncoding::Geographic),
            Some(other) => Err(WfsError::UnsupportedCrs(other.to_string())),
        }
    }

    pub fn crs(&self) -> CrsCode {
        match self {
            PointEncoding::WebMercator => CrsCode::Epsg3857,
            PointEncoding::Geographic => CrsCode::Epsg4326,
        }
    }

    /// Value of the `srsName` attribute.
    pub fn srs_name(&self) -> String {
        self.crs().urn()
    }

    pub fn pos(&self, row: &FeatureRow) -> String {
        match self {
            PointEncoding::WebMercator => format!("{} {}", row.x, row.y),
            PointEncoding::Geographic => format!("{} {}", row.latitude, row.longitude),
        }
    }
}

/// A `wfs:FeatureCollection` ready to be written.
#[derive(Debug)]
pub struct GmlFeatureCollection<'a> {
    features: &'a [DecoratedFeature],
    number_matched: u64,
    encoding: PointEncoding,
    excluded_columns: &'a HashSet<String>,
    time_stamp: DateTime<Utc>,
}

impl<'a> GmlFeatureCollection<'a> {
    /// Prepare a collection document.
    ///
    /// `number_matched` is raised to the number of features when it is
    /// smaller. Fails with `UnsupportedCrs` for anything but EPSG:3857 and
    /// EPSG:4326, and with `Serialization` when a featureset or an emitted
    /// column name cannot be an XML element name.
    pub fn new(
        features: &'a [DecoratedFeature],
        number_matched: u64,
        srs_name: Option<CrsCode>,
        excluded_columns: &'a HashSet<String>,
    ) -> WfsResult<Self> {
        let encoding = PointEncoding::for_crs(srs_name)?;
        for feature in features {
            check_element_names(feature, excluded_columns)?;
        }
        Ok(Self {
            features,
            number_matched: number_matched.max(features.len() as u64),
            encoding,
            excluded_columns,
            time_stamp: Utc::now(),
        })
    }

    pub fn with_time_stamp(mut self, time_stamp: DateTime<Utc>) -> Self {
        self.time_stamp = time_stamp;
        self
    }

    pub fn number_matched(&self) -> u64 {
        self.number_matched
    }

    pub fn number_returned(&self) -> usize {
        self.features.len()
    }

    /// Pretty-printed XML text.
    pub fn to_xml(&self) -> WfsResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let time_stamp = self.time_stamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        let number_matched = self.number_matched.to_string();
        let number_returned = self.number_returned().to_string();
        let root = BytesStart::new("wfs:FeatureCollection").with_attributes([
            ("xmlns:wfs", namespaces::WFS),
            ("xmlns:gml", namespaces::GML),
            ("xmlns:xsi", namespaces::XSI),
            ("timeStamp", time_stamp.as_str()),
            ("numberMatched", number_matched.as_str()),
            ("numberReturned", number_returned.as_str()),
        ]);
        writer.write_event(Event::Start(root))?;

        for feature in self.features {
            self.write_member(&mut writer, feature)?;
        }

        writer.write_event(Event::End(BytesEnd::new("wfs:FeatureCollection")))?;

        String::from_utf8(writer.into_inner())
            .map_err(|e| WfsError::Serialization(format!("XML is not UTF-8: {}", e)))
    }

    fn write_member<W: Write>(
        &self,
        writer: &mut Writer<W>,
        feature: &DecoratedFeature,
    ) -> WfsResult<()> {
        let row = &feature.row;
        let gml_id = row.gml_id();

        writer.write_event(Event::Start(BytesStart::new("wfs:member")))?;
        writer.write_event(Event::Start(
            BytesStart::new(row.featureset.as_str()).with_attributes([("gml:id", gml_id.as_str())]),
        ))?;

        for (name, value) in feature.properties() {
            if name == columns::GEOM || self.excluded_columns.contains(name) {
                continue;
            }
            write_text_element(writer, name, &value)?;
        }

        if !self.excluded_columns.contains(columns::GEOM) {
            self.write_point(writer, row)?;
        }

        writer.write_event(Event::End(BytesEnd::new(row.featureset.as_str())))?;
        writer.write_event(Event::End(BytesEnd::new("wfs:member")))?;
        Ok(())
    }

    fn write_point<W: Write>(&self, writer: &mut Writer<W>, row: &FeatureRow) -> WfsResult<()> {
        let point_id = format!("GmlPoint.{}", row.id);
        let srs_name = self.encoding.srs_name();

        writer.write_event(Event::Start(BytesStart::new(columns::GEOM)))?;
        writer.write_event(Event::Start(BytesStart::new("gml:Point").with_attributes([
            ("gml:id", point_id.as_str()),
            ("srsName", srs_name.as_str()),
            ("srsDimension", "2"),
        ])))?;
        write_text_element(writer, "gml:pos", &self.encoding.pos(row))?;
        writer.write_event(Event::End(BytesEnd::new("gml:Point")))?;
        writer.write_event(Event::End(BytesEnd::new(columns::GEOM)))?;
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_.-]*`, the subset of XML NCNames used for feature
/// type and property element names.
pub fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

fn check_element_names(
    feature: &DecoratedFeature,
    excluded_columns: &HashSet<String>,
) -> WfsResult<()> {
    if !is_ncname(&feature.row.featureset) {
        return Err(WfsError::Serialization(format!(
            "featureset '{}' is not a valid XML element name",
            feature.row.featureset
        )));
    }
    let bad = feature
        .properties()
        .into_iter()
        .map(|(name, _)| name)
        .find(|name| !excluded_columns.contains(*name) && !is_ncname(name));
    match bad {
        Some(name) => Err(WfsError::Serialization(format!(
            "column '{}' is not a valid XML element name",
            name
        ))),
        None => Ok(()),
    }
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> WfsResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
