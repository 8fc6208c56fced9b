// ABOUTME: The full upgrade request path: validate, detect, list, resolve, dispatch.
// ABOUTME: Shared by the HTTP handler and the `upgrade` CLI command.

use snafu::ResultExt;
use std::sync::Arc;

use super::coordinator::UpgradeCoordinator;
use super::docker::DockerUpgrader;
use super::error::{
    DetectionSnafu, DispatchSnafu, InvalidRequestSnafu, ResolveSnafu, StoreSnafu,
    SystemUpgradeError,
};
use super::kubernetes::KubernetesUpgrader;
use super::overrides::UpgradeOverrides;
use crate::config::Config;
use crate::endpoint::{Endpoint, EndpointStore, FileEndpointStore, resolve_local_endpoint};
use crate::platform::{Platform, PlatformDetector, SystemDetector, SystemEnvironment};
use crate::types::LicenseKey;

/// Upgrade orchestration over injected collaborators.
#[derive(Clone)]
pub struct SystemUpgrade {
    detector: Arc<dyn PlatformDetector>,
    store: Arc<dyn EndpointStore>,
    coordinator: Arc<UpgradeCoordinator>,
}

impl std::fmt::Debug for SystemUpgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemUpgrade")
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl SystemUpgrade {
    pub fn new(
        detector: Arc<dyn PlatformDetector>,
        store: Arc<dyn EndpointStore>,
        coordinator: Arc<UpgradeCoordinator>,
    ) -> Self {
        Self {
            detector,
            store,
            coordinator,
        }
    }

    /// Production wiring: system detector, file store, real strategies.
    ///
    /// The coordinator's platform is detected here once. If detection fails
    /// the coordinator is built for [`Platform::Unknown`] and rejects every
    /// dispatch, while requests still report the detection error first.
    pub fn from_config(config: &Config) -> Self {
        let detector = Arc::new(SystemDetector::new(SystemEnvironment));
        let platform = detector
            .determine_container_platform()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "platform detection failed at startup");
                Platform::Unknown
            });
        tracing::info!(%platform, version = %config.version, "upgrade coordinator ready");

        let overrides = UpgradeOverrides::from_env();
        let docker = Arc::new(DockerUpgrader::new(config.docker.clone(), overrides.clone()));
        let kubernetes = Arc::new(KubernetesUpgrader::new(
            config.kubernetes.clone(),
            overrides,
        ));
        let coordinator = Arc::new(UpgradeCoordinator::new(
            platform,
            config.version.clone(),
            docker,
            kubernetes,
        ));

        Self::new(
            detector,
            Arc::new(FileEndpointStore::new(config.store.path.clone())),
            coordinator,
        )
    }

    pub fn coordinator(&self) -> &UpgradeCoordinator {
        &self.coordinator
    }

    /// Validate `license`, find the local endpoint and dispatch the upgrade.
    ///
    /// An invalid license is rejected before the platform is probed or the
    /// store is read.
    pub async fn upgrade(&self, license: &str) -> Result<(), SystemUpgradeError> {
        let license = LicenseKey::new(license).context(InvalidRequestSnafu)?;
        let endpoint = self.guess_local_endpoint().await?;

        self.coordinator
            .upgrade(&endpoint, &license)
            .await
            .context(DispatchSnafu)
    }

    /// Detect the platform and resolve the endpoint representing this instance.
    pub async fn guess_local_endpoint(&self) -> Result<Endpoint, SystemUpgradeError> {
        let platform = self
            .detector
            .determine_container_platform()
            .context(DetectionSnafu)?;
        let endpoints = self.store.list_endpoints().await.context(StoreSnafu)?;

        let endpoint = resolve_local_endpoint(&endpoints, platform).context(ResolveSnafu)?;
        tracing::debug!(%platform, endpoint = %endpoint.id, name = %endpoint.name, "local endpoint");

        Ok(endpoint.clone())
    }
}
