// ABOUTME: Single-flight upgrade coordinator.
// ABOUTME: Admits at most one upgrade per process lifetime, then dispatches to the platform strategy.

use parking_lot::Mutex;
use std::sync::Arc;

use super::error::UpgradeError;
use super::state::{UpgradeState, UpgradeTicket};
use super::strategy::UpgradeStrategy;
use crate::endpoint::{Endpoint, is_local_candidate};
use crate::platform::Platform;
use crate::types::LicenseKey;

/// Owns the upgrade lifecycle for one control-plane process.
///
/// Built once with the platform it runs on and shared by reference (`Arc`)
/// with every request handler.
pub struct UpgradeCoordinator {
    platform: Platform,
    version: String,
    docker: Arc<dyn UpgradeStrategy>,
    kubernetes: Arc<dyn UpgradeStrategy>,
    state: Mutex<UpgradeState>,
}

impl std::fmt::Debug for UpgradeCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpgradeCoordinator")
            .field("platform", &self.platform)
            .field("version", &self.version)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl UpgradeCoordinator {
    pub fn new(
        platform: Platform,
        version: impl Into<String>,
        docker: Arc<dyn UpgradeStrategy>,
        kubernetes: Arc<dyn UpgradeStrategy>,
    ) -> Self {
        Self {
            platform,
            version: version.into(),
            docker,
            kubernetes,
            state: Mutex::new(UpgradeState::Idle),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// The control-plane version upgrades install.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> UpgradeState {
        self.state.lock().clone()
    }

    /// Upgrade the control plane running behind `endpoint`.
    ///
    /// `endpoint` must be a local candidate for the coordinator's platform;
    /// otherwise the call fails with
    /// [`UpgradeError::EndpointPlatformMismatch`] and the state stays `Idle`.
    /// The transition to `InProgress` is recorded before the strategy runs
    /// and is never undone. Concurrent and later calls fail with
    /// [`UpgradeError::UpgradeAlreadyInProgress`]. Strategy errors are
    /// returned as-is and nothing is retried.
    pub async fn upgrade(
        &self,
        endpoint: &Endpoint,
        license: &LicenseKey,
    ) -> Result<(), UpgradeError> {
        let strategy = self.strategy()?;
        self.check_endpoint(endpoint)?;
        self.admit(endpoint)?;

        tracing::info!(
            strategy = strategy.name(),
            endpoint = %endpoint.id,
            version = %self.version,
            edition = license.edition(),
            "dispatching upgrade"
        );

        strategy
            .upgrade(endpoint, license, &self.version)
            .await
            .map_err(UpgradeError::Strategy)
    }

    fn strategy(&self) -> Result<&Arc<dyn UpgradeStrategy>, UpgradeError> {
        match self.platform {
            Platform::Docker => Ok(&self.docker),
            Platform::Kubernetes => Ok(&self.kubernetes),
            Platform::Unknown => Err(UpgradeError::UnsupportedPlatform(self.platform)),
        }
    }

    fn check_endpoint(&self, endpoint: &Endpoint) -> Result<(), UpgradeError> {
        if is_local_candidate(endpoint, self.platform) {
            return Ok(());
        }

        tracing::warn!(
            endpoint = %endpoint.id,
            endpoint_type = %endpoint.endpoint_type,
            platform = %self.platform,
            "rejecting upgrade: endpoint does not match platform"
        );
        Err(UpgradeError::EndpointPlatformMismatch {
            endpoint: endpoint.id,
            endpoint_type: endpoint.endpoint_type,
            platform: self.platform,
        })
    }

    /// Check-and-set `Idle -> InProgress`. No I/O happens under the lock.
    fn admit(&self, endpoint: &Endpoint) -> Result<(), UpgradeError> {
        let mut state = self.state.lock();

        if let UpgradeState::InProgress(ticket) = &*state {
            tracing::warn!(
                holder = %ticket.holder,
                pid = ticket.pid,
                started_at = %ticket.started_at,
                "rejecting upgrade: one is already in progress"
            );
            return Err(UpgradeError::UpgradeAlreadyInProgress(ticket.clone()));
        }

        *state = UpgradeState::InProgress(UpgradeTicket::new(endpoint.id));
        Ok(())
    }
}
