//! API error handling for the gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::dispatch::DispatchError;

/// Error envelope returned for every non-200 response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: u16, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
        }
    }

    pub fn with_details(code: u16, message: String, details: serde_json::Value) -> Self {
        Self {
            code,
            message,
            details: Some(details),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(400, message.to_string())
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(404, message.to_string())
    }

    pub fn internal_server_error(message: &str) -> Self {
        Self::new(500, message.to_string())
    }

    pub fn unknown_selector(selector: &str) -> Self {
        Self::with_details(
            404,
            format!("No implementation for function with selector {}", selector),
            serde_json::json!({
                "selector": selector
            }),
        )
    }

    pub fn validation_error(error: ValidationError) -> Self {
        Self::with_details(
            400,
            error.message.clone(),
            serde_json::json!({
                "field": error.field,
                "value": error.value
            }),
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API Error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Rejected request field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub value: Option<serde_json::Value>,
}

impl ValidationError {
    pub fn new(field: &str, message: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            value: Some(serde_json::Value::String(value.to_string())),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        warn!("Rejected request: {}", err);
        Self::validation_error(err)
    }
}

impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::CalldataTooShort(_) | DispatchError::InvalidArguments(_) => {
                warn!("Rejected call: {}", err);
                Self::bad_request(&err.to_string())
            }
            DispatchError::UnknownSelector(selector) => {
                warn!("No handler for selector {}", selector);
                Self::unknown_selector(&selector)
            }
            DispatchError::Handler(_) | DispatchError::InvalidOutput(_) => {
                error!("Handler fault: {}", err);
                Self::internal_server_error(&err.to_string())
            }
        }
    }
}
