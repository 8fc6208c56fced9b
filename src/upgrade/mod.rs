// ABOUTME: Upgrade coordination: single-flight state, strategy dispatch, and orchestration.
// ABOUTME: Docker and Kubernetes strategies launch an updater that replaces this process.

mod coordinator;
mod docker;
mod error;
mod kubernetes;
mod overrides;
mod service;
mod state;
mod strategy;
mod updater;

pub use coordinator::UpgradeCoordinator;
pub use docker::{DockerUpgrader, updater_container_body, updater_container_name};
pub use error::{SystemUpgradeError, SystemUpgradeErrorKind, UpgradeError};
pub use kubernetes::{KubernetesUpgrader, upgrade_job};
pub use overrides::{IMAGE_PREFIX_ENV, SKIP_PULL_IMAGE_ENV, UPDATER_IMAGE_ENV, UpgradeOverrides};
pub use service::SystemUpgrade;
pub use state::{UpgradeState, UpgradeTicket};
pub use strategy::{StrategyError, UpgradeStrategy};
pub use updater::UpdaterPlan;
