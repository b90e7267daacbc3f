//! OWS 1.1 exception reports.

use quick_xml::escape::escape;
use wfs_common::WfsError;

use crate::namespaces;

/// Text sent for server-side failures in place of the internal message.
pub const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// A single-exception `ows:ExceptionReport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionReport {
    pub code: String,
    pub locator: Option<String>,
    pub text: String,
    pub status: u16,
}

impl ExceptionReport {
    pub fn new(code: impl Into<String>, text: impl Into<String>, status: u16) -> Self {
        Self {
            code: code.into(),
            locator: None,
            text: text.into(),
            status,
        }
    }

    pub fn with_locator(mut self, locator: impl Into<String>) -> Self {
        self.locator = Some(locator.into());
        self
    }

    /// Report for an error. Only client errors echo their message.
    pub fn from_error(err: &WfsError) -> Self {
        let text = if err.is_client_error() {
            err.to_string()
        } else {
            GENERIC_SERVER_ERROR.to_string()
        };
        let report = Self::new(err.exception_code(), text, err.http_status_code());
        match err.locator() {
            Some(locator) => report.with_locator(locator),
            None => report,
        }
    }

    pub fn to_xml(&self) -> String {
        let locator = self
            .locator
            .as_deref()
            .map(|l| format!(r#" locator="{}""#, escape(l)))
            .unwrap_or_default();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ows:ExceptionReport xmlns:ows="{}" version="2.0.0">
  <ows:Exception exceptionCode="{}"{}>
    <ows:ExceptionText>{}</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#,
            namespaces::OWS,
            escape(&self.code),
            locator,
            escape(&self.text)
        )
    }
}
