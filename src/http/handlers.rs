// ABOUTME: Handlers for the system upgrade and status routes.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::ApiError;
use crate::platform::Platform;
use crate::upgrade::{SystemUpgrade, UpgradeState};

#[derive(Debug, Deserialize)]
pub struct UpgradePayload {
    /// License key. A missing field is treated like an empty one.
    #[serde(rename = "License", alias = "license", default)]
    pub license: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub platform: Platform,
    pub version: String,
    pub upgrade: UpgradeState,
}

/// `POST /system/upgrade`
///
/// 204 once the strategy returns cleanly. A successful upgrade usually
/// replaces the process first, so a dropped connection is also success.
pub async fn upgrade(
    State(system): State<Arc<SystemUpgrade>>,
    payload: Result<Json<UpgradePayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload?;
    system.upgrade(&payload.license).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /system/status`
pub async fn status(State(system): State<Arc<SystemUpgrade>>) -> Json<StatusResponse> {
    let coordinator = system.coordinator();
    Json(StatusResponse {
        platform: coordinator.platform(),
        version: coordinator.version().to_string(),
        upgrade: coordinator.state(),
    })
}
