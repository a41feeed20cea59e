use thiserror::Error;

/// Conditions raised by the window anomaly detector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectorError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("insufficient prices fetched: need at least {required}, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("degenerate window before index {index}: standard deviation is zero")]
    DegenerateWindow { index: usize },
}

/// Failures at the price fetch boundary. Transport, HTTP status and payload
/// problems stay distinct so callers can tell a network failure from bad data.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gemini API error (status {status}): {reason}")]
    Status { status: u16, reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Json(_) | Self::Parse(_))
    }
}
