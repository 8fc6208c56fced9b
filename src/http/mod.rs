// ABOUTME: axum router exposing the upgrade orchestration over HTTP.
// ABOUTME: Thin boundary: every decision lives in SystemUpgrade.

mod error;
mod handlers;

pub use error::{ApiError, ErrorResponse};
pub use handlers::{StatusResponse, UpgradePayload};

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

use crate::upgrade::SystemUpgrade;

pub fn router(system: Arc<SystemUpgrade>) -> Router {
    Router::new()
        .route("/system/upgrade", post(handlers::upgrade))
        .route("/system/status", get(handlers::status))
        .with_state(system)
}
