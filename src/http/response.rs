//! Error responses.
//!
//! Failures render as `{"error": "<message>", "kind": "<kind>"}`. The message
//! is exactly what the screens display.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::donation::DonationError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// Handler error wrapper.
#[derive(Debug)]
pub struct ApiError(pub DonationError);

impl From<DonationError> for ApiError {
    fn from(err: DonationError) -> Self {
        ApiError(err)
    }
}

/// HTTP status for each error kind.
pub fn status_for(err: &DonationError) -> StatusCode {
    match err {
        DonationError::Validation(_) | DonationError::Build(_) => StatusCode::BAD_REQUEST,
        DonationError::NotConnected => StatusCode::UNAUTHORIZED,
        DonationError::WalletUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        DonationError::ConnectionFailed(_) | DonationError::Signing(_) => StatusCode::FORBIDDEN,
        DonationError::AccountLookup(_) | DonationError::Submission(_) => StatusCode::BAD_GATEWAY,
        DonationError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "Request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}
