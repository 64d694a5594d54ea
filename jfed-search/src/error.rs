//! Request-level errors
//!
//! Store-level failures never reach here; the federation engine absorbs
//! them. What remains is a malformed request or an internal fault, both of
//! which fail the whole request.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jfed_common::config::Environment;
use jfed_common::types::ErrorResponse;
use thiserror::Error;

/// Hard failure of one search request
#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    /// Body or filter could not be understood
    #[error("Invalid search request: {0}")]
    BadRequest(String),

    /// Unexpected fault while searching
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SearchError {
    pub fn status(&self) -> StatusCode {
        match self {
            SearchError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SearchError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error body; internal detail is only exposed in development
    pub fn to_body(&self, environment: Environment) -> ErrorResponse {
        match self {
            SearchError::BadRequest(detail) => ErrorResponse {
                success: false,
                message: "Invalid search request".to_string(),
                error: Some(detail.clone()),
            },
            SearchError::Internal(detail) => ErrorResponse {
                success: false,
                message: "Internal server error".to_string(),
                error: (environment == Environment::Development).then(|| detail.clone()),
            },
        }
    }
}

impl From<jfed_common::Error> for SearchError {
    fn from(err: jfed_common::Error) -> Self {
        match err {
            jfed_common::Error::InvalidInput(msg) => SearchError::BadRequest(msg),
            other => SearchError::Internal(other.to_string()),
        }
    }
}

/// [`SearchError`] paired with the environment it is reported in
#[derive(Debug)]
pub struct ApiError {
    pub error: SearchError,
    pub environment: Environment,
}

impl ApiError {
    pub fn new(error: SearchError, environment: Environment) -> Self {
        Self { error, environment }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        let body = Json(self.error.to_body(self.environment));
        (status, body).into_response()
    }
}
