//! Server base URL used for feature viewer links.

use axum::http::{header, HeaderMap};

const FORWARDED_PROTO: &str = "x-forwarded-proto";
const FORWARDED_HOST: &str = "x-forwarded-host";

/// Resolve the base URL clients reach this server at.
///
/// A configured public URL wins. Otherwise the scheme comes from
/// `X-Forwarded-Proto` (default `http`) and the host from `X-Forwarded-Host`,
/// then `Host`, then the listen address. No trailing slash.
pub fn server_base_url(headers: &HeaderMap, public_url: Option<&str>, listen_addr: &str) -> String {
    if let Some(url) = public_url.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    let scheme = first_value(headers, FORWARDED_PROTO).unwrap_or("http");
    let host = first_value(headers, FORWARDED_HOST)
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .unwrap_or(listen_addr);

    format!("{}://{}", scheme, host)
}

/// First comma-separated item of a header, as proxies append to these.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
