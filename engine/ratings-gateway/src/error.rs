//! Error types for the RatingsGateway

use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;

/// Errors that can occur in the RatingsGateway
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Team not found: {0}")]
    TeamNotFound(String),
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl From<rating_engine::EngineError> for GatewayError {
    fn from(err: rating_engine::EngineError) -> Self {
        GatewayError::Config(err.to_string())
    }
}

/// Result type for RatingsGateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    pub timestamp: String,
}

/// Error detail
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// A request failure carried through warp as a rejection
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl warp::reject::Reject for ApiError {}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Any store failure: the caller only learns that data is unavailable
    pub fn data_unavailable(err: &GatewayError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "DATA_UNAVAILABLE", "Data unavailable")
            .with_details(serde_json::Value::String(err.to_string()))
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", "Method not allowed")
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message.clone(),
                details: self.details.clone(),
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::TeamNotFound(name) => {
                Self::new(StatusCode::NOT_FOUND, "TEAM_NOT_FOUND", "Team not found")
                    .with_details(serde_json::json!({ "team_name": name }))
            }
            other => Self::data_unavailable(&other),
        }
    }
}
