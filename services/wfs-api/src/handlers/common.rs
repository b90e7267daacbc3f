//! Response helpers shared by the WFS handlers.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use wfs_common::WfsError;
use wfs_protocol::{media_types, ExceptionReport};

/// OWS exception report response for an error.
///
/// Server-side errors are logged here; their details never reach the body.
pub fn ows_exception(err: &WfsError) -> Response {
    if !err.is_client_error() {
        tracing::error!(error = %err, kind = err.kind(), "GetFeature failed");
    }
    report_response(&ExceptionReport::from_error(err))
}

pub fn report_response(report: &ExceptionReport) -> Response {
    let status =
        StatusCode::from_u16(report.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, media_types::XML)],
        report.to_xml(),
    )
        .into_response()
}

/// 200 response with the given content type.
pub fn document(content_type: &'static str, body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}
