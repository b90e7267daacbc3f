//! Error types for the WFS services.

use thiserror::Error;

/// Result type alias using WfsError.
pub type WfsResult<T> = Result<T, WfsError>;

/// Primary error type for WFS operations.
#[derive(Debug, Error)]
pub enum WfsError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Operation not supported: {0}")]
    OperationNotSupported(String),

    // === Encoding Errors ===
    /// The requested CRS was recognized but GML cannot place a point in it.
    #[error("Unsupported CRS for GML encoding: {0}")]
    UnsupportedCrs(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    // === Data Source Errors ===
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Feature row is missing required column '{0}'")]
    MissingColumn(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl WfsError {
    /// Get the OWS exception code for this error.
    pub fn exception_code(&self) -> &'static str {
        match self {
            WfsError::MissingParameter(_) => "MissingParameterValue",
            WfsError::InvalidParameter { .. } => "InvalidParameterValue",
            WfsError::OperationNotSupported(_) => "OperationNotSupported",
            _ => "NoApplicableCode",
        }
    }

    /// Get the OWS exception locator (the offending parameter), if any.
    pub fn locator(&self) -> Option<&str> {
        match self {
            WfsError::MissingParameter(param) => Some(param),
            WfsError::InvalidParameter { param, .. } => Some(param),
            WfsError::OperationNotSupported(_) => Some("request"),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WfsError::MissingParameter(_)
            | WfsError::InvalidParameter { .. }
            | WfsError::OperationNotSupported(_) => 400,

            _ => 500,
        }
    }

    /// Whether the message is safe to echo back to the client.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }

    /// Short label used for error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WfsError::MissingParameter(_)
            | WfsError::InvalidParameter { .. }
            | WfsError::OperationNotSupported(_) => "request",
            WfsError::UnsupportedCrs(_) => "unsupported_crs",
            WfsError::Serialization(_) => "serialization",
            WfsError::DataSource(_) | WfsError::MissingColumn(_) => "data_source",
            WfsError::Configuration(_) | WfsError::InternalError(_) => "internal",
        }
    }

    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        WfsError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for WfsError {
    fn from(err: std::io::Error) -> Self {
        WfsError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for WfsError {
    fn from(err: serde_json::Error) -> Self {
        WfsError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<quick_xml::Error> for WfsError {
    fn from(err: quick_xml::Error) -> Self {
        WfsError::Serialization(format!("XML error: {}", err))
    }
}
