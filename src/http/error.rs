// ABOUTME: HTTP error responses for the system routes.
// ABOUTME: Maps upgrade error kinds to 400/500 with a JSON message/details body.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::upgrade::{SystemUpgradeError, SystemUpgradeErrorKind};

const INVALID_PAYLOAD: &str = "Invalid request payload";
const ENDPOINT_NOT_FOUND: &str = "Failed to guess local endpoint";
const UPGRADE_FAILED: &str = "Failed to upgrade";

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub details: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    details: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SystemUpgradeError> for ApiError {
    fn from(err: SystemUpgradeError) -> Self {
        let kind = err.kind();
        let status = if kind.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = match kind {
            SystemUpgradeErrorKind::MissingLicense | SystemUpgradeErrorKind::InvalidLicenseFormat => {
                INVALID_PAYLOAD
            }
            SystemUpgradeErrorKind::PlatformUndetermined
            | SystemUpgradeErrorKind::StoreUnavailable
            | SystemUpgradeErrorKind::LocalEndpointNotFound => ENDPOINT_NOT_FOUND,
            SystemUpgradeErrorKind::UnsupportedPlatform => match &err {
                SystemUpgradeError::Resolve { .. } => ENDPOINT_NOT_FOUND,
                _ => UPGRADE_FAILED,
            },
            SystemUpgradeErrorKind::EndpointPlatformMismatch
            | SystemUpgradeErrorKind::UpgradeAlreadyInProgress
            | SystemUpgradeErrorKind::StrategyFailed => UPGRADE_FAILED,
        };

        Self {
            status,
            message,
            details: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: INVALID_PAYLOAD,
            details: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, details = %self.details, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, details = %self.details, "{}", self.message);
        }

        let body = ErrorResponse {
            message: self.message.to_string(),
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
