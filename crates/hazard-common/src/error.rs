//! Error types for the hazard ranking services.

use thiserror::Error;

/// Result type alias using HazardError.
pub type HazardResult<T> = Result<T, HazardError>;

/// Primary error type for ranking operations.
#[derive(Debug, Error)]
pub enum HazardError {
    // === Request Errors ===
    #[error("Invalid value for 'top': {0}")]
    InvalidLimit(String),

    #[error("Unknown simulation model: {0}")]
    UnknownModel(String),

    #[error("Unknown ranking metric: {0}")]
    UnknownMetric(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // === Database Errors ===
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Query timed out")]
    Timeout,

    // === Geometry Errors ===
    #[error("Coordinate transformation failed: {0}")]
    Transform(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl HazardError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            HazardError::InvalidLimit(_) => 400,

            HazardError::UnknownModel(_)
            | HazardError::UnknownMetric(_)
            | HazardError::NotFound(_) => 404,

            HazardError::Unavailable(_) => 503,
            HazardError::Timeout => 504,

            _ => 500,
        }
    }

    /// Short machine-readable identifier used in error bodies and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            HazardError::InvalidLimit(_) => "ValidationError",
            HazardError::UnknownModel(_)
            | HazardError::UnknownMetric(_)
            | HazardError::NotFound(_) => "NotFound",
            HazardError::Query(_) => "QueryError",
            HazardError::Unavailable(_) => "ServiceUnavailable",
            HazardError::Timeout => "Timeout",
            HazardError::Transform(_) => "TransformError",
            HazardError::Config(_) => "ConfigError",
            HazardError::Internal(_) => "InternalError",
        }
    }

    /// Whether the request was rejected before reaching the database.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

impl From<serde_json::Error> for HazardError {
    fn from(err: serde_json::Error) -> Self {
        HazardError::Internal(format!("JSON error: {}", err))
    }
}
