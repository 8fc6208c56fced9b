// ABOUTME: Platform upgrade strategy seam and its error type.
// ABOUTME: A strategy launches the new control-plane version and is expected to replace this process.

use crate::endpoint::{Endpoint, EndpointId};
use crate::types::{LicenseKey, ParseImageRefError};
use async_trait::async_trait;

/// A platform-specific procedure that performs the upgrade mechanics.
#[async_trait]
pub trait UpgradeStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Launch `version` of the control plane for `endpoint`.
    ///
    /// A successful launch normally terminates the calling process before
    /// this returns, so returning at all is not proof of success.
    async fn upgrade(
        &self,
        endpoint: &Endpoint,
        license: &LicenseKey,
        version: &str,
    ) -> Result<(), StrategyError>;
}

/// Errors raised by upgrade strategies.
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("endpoint {0} is not eligible for upgrade")]
    IneligibleEndpoint(EndpointId),

    #[error("invalid image: {0}")]
    InvalidImage(#[from] ParseImageRefError),

    #[error("failed to connect to container engine: {0}")]
    Connection(String),

    #[error("failed to pull image {image}: {message}")]
    ImagePull { image: String, message: String },

    #[error("failed to inspect image {image}: {message}")]
    ImageMissing { image: String, message: String },

    #[error("failed to launch updater: {0}")]
    Launch(String),

    #[error("updater failed: {0}")]
    UpdaterFailed(String),

    #[error("kubernetes error: {0}")]
    Kubernetes(#[from] kube::Error),

    #[error("timed out after {0} seconds waiting for the updater")]
    Timeout(u64),

    #[error("upgrade failed: server should have been restarted by the updater")]
    NotReplaced,
}

impl StrategyError {
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    pub fn updater_failed(msg: impl Into<String>) -> Self {
        Self::UpdaterFailed(msg.into())
    }
}
