// ABOUTME: Docker/Podman upgrade strategy built on bollard.
// ABOUTME: Pulls the new edition, then runs the updater container against the engine socket.

use async_trait::async_trait;
use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, Mount, MountTypeEnum};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, StartContainerOptions, WaitContainerOptions,
};
use futures::StreamExt;
use std::collections::HashMap;

use super::overrides::UpgradeOverrides;
use super::strategy::{StrategyError, UpgradeStrategy};
use super::updater::UpdaterPlan;
use crate::config::DockerConfig;
use crate::endpoint::Endpoint;
use crate::platform::{ContainerEngine, default_socket_path};
use crate::types::{ImageRef, LicenseKey};

/// Where the engine socket is mounted inside the updater container.
const UPDATER_SOCKET_TARGET: &str = "/var/run/docker.sock";

/// Upgrades a control plane running as a container on Docker or Podman.
#[derive(Debug, Clone)]
pub struct DockerUpgrader {
    config: DockerConfig,
    overrides: UpgradeOverrides,
}

impl DockerUpgrader {
    pub fn new(config: DockerConfig, overrides: UpgradeOverrides) -> Self {
        Self { config, overrides }
    }

    /// Socket for the endpoint's engine, unless one is configured.
    pub fn socket_for(&self, engine: ContainerEngine) -> String {
        self.config
            .socket
            .clone()
            .unwrap_or_else(|| default_socket_path(engine))
    }

    fn connect(socket: &str) -> Result<Docker, StrategyError> {
        Docker::connect_with_unix(socket, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| StrategyError::Connection(format!("{socket}: {e}")))
    }

    async fn ensure_image(
        client: &Docker,
        image: &ImageRef,
        skip_pull: bool,
    ) -> Result<(), StrategyError> {
        let image_name = image.to_string();

        if skip_pull {
            tracing::debug!(image = %image_name, "skipping pull, inspecting local image");
            return client
                .inspect_image(&image_name)
                .await
                .map(|_| ())
                .map_err(|e| StrategyError::ImageMissing {
                    image: image_name,
                    message: e.to_string(),
                });
        }

        tracing::info!(image = %image_name, "pulling image");
        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            result.map_err(|e| StrategyError::ImagePull {
                image: image_name.clone(),
                message: e.to_string(),
            })?;
        }

        Ok(())
    }

    async fn launch_updater(
        client: &Docker,
        plan: &UpdaterPlan,
        socket: &str,
    ) -> Result<String, StrategyError> {
        let name = updater_container_name(plan.image.tag(), chrono::Utc::now().timestamp());
        let opts = CreateContainerOptions {
            name: Some(name.clone()),
            ..Default::default()
        };

        let response = client
            .create_container(Some(opts), updater_container_body(plan, socket))
            .await
            .map_err(|e| StrategyError::launch(format!("failed to create {name}: {e}")))?;

        client
            .start_container(&response.id, None::<StartContainerOptions>)
            .await
            .map_err(|e| StrategyError::launch(format!("failed to start {name}: {e}")))?;

        tracing::info!(container = %name, id = %response.id, "updater started");
        Ok(response.id)
    }

    async fn wait_for_updater(&self, client: &Docker, id: &str) -> Result<(), StrategyError> {
        let mut stream = std::pin::pin!(client.wait_container(id, None::<WaitContainerOptions>));
        let timeout = self.config.wait_timeout;

        let outcome = tokio::time::timeout(timeout, stream.next())
            .await
            .map_err(|_| StrategyError::Timeout(timeout.as_secs()))?;

        match outcome {
            Some(Ok(response)) if response.status_code == 0 => Ok(()),
            Some(Ok(response)) => Err(StrategyError::updater_failed(format!(
                "updater exited with code {}",
                response.status_code
            ))),
            Some(Err(bollard::errors::Error::DockerContainerWaitError { error, code })) => Err(
                StrategyError::updater_failed(format!("updater exited with code {code}: {error}")),
            ),
            Some(Err(e)) => Err(StrategyError::updater_failed(e.to_string())),
            None => Err(StrategyError::updater_failed("wait stream ended without a status")),
        }
    }
}

#[async_trait]
impl UpgradeStrategy for DockerUpgrader {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn upgrade(
        &self,
        endpoint: &Endpoint,
        license: &LicenseKey,
        version: &str,
    ) -> Result<(), StrategyError> {
        let (Some(env_type), Some(engine)) = (endpoint.docker_env_type(), endpoint.container_engine)
        else {
            return Err(StrategyError::IneligibleEndpoint(endpoint.id));
        };

        let plan = UpdaterPlan::new(
            &self.config.images,
            &self.overrides,
            env_type.as_str(),
            license,
            version,
        )?;
        let socket = self.socket_for(engine);
        let client = Self::connect(&socket)?;

        Self::ensure_image(&client, &plan.image, plan.skip_pull).await?;
        // The updater image is always pulled; skip-pull only covers the edition image.
        Self::ensure_image(&client, &plan.updater_image, false).await?;

        let id = Self::launch_updater(&client, &plan, &socket).await?;
        self.wait_for_updater(&client, &id).await?;

        // The updater replaces this container when it succeeds.
        Err(StrategyError::NotReplaced)
    }
}

/// Container name for an updater run: `elevate-upgrade-<unix ts>-<version>`.
pub fn updater_container_name(version: &str, timestamp: i64) -> String {
    format!("elevate-upgrade-{}-{}", timestamp, version.replace('.', "-"))
}

/// Create request for the updater container.
pub fn updater_container_body(plan: &UpdaterPlan, socket: &str) -> ContainerCreateBody {
    let labels = HashMap::from([
        ("elevate.managed".to_string(), "true".to_string()),
        ("elevate.upgrade.image".to_string(), plan.image.to_string()),
    ]);

    let host_config = HostConfig {
        mounts: Some(vec![Mount {
            source: Some(socket.to_string()),
            target: Some(UPDATER_SOCKET_TARGET.to_string()),
            typ: Some(MountTypeEnum::BIND),
            read_only: Some(false),
            ..Default::default()
        }]),
        ..Default::default()
    };

    ContainerCreateBody {
        image: Some(plan.updater_image.to_string()),
        cmd: Some(plan.args.clone()),
        labels: Some(labels),
        host_config: Some(host_config),
        ..Default::default()
    }
}
