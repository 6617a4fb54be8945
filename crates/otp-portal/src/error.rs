//! Error types for the portal.

use crate::html;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use record_store::StoreError;
use thiserror::Error;
use tracing::error;

/// Portal error types.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PortalError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PortalError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Server-side failures are logged in full and shown generically
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Something went wrong. Please try again later.".to_string()
        } else {
            self.to_string()
        };

        (status, Html(html::error_page(&message))).into_response()
    }
}
