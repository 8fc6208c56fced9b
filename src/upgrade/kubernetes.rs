// ABOUTME: Kubernetes upgrade strategy built on kube.
// ABOUTME: Runs the updater as a one-shot Job and waits for it to finish.

use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::api::core::v1::{Container, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Client;
use kube::api::{Api, PostParams};
use kube::runtime::wait::await_condition;
use std::collections::BTreeMap;

use super::overrides::UpgradeOverrides;
use super::strategy::{StrategyError, UpgradeStrategy};
use super::updater::UpdaterPlan;
use crate::config::KubernetesConfig;
use crate::endpoint::Endpoint;
use crate::types::LicenseKey;

const ENV_TYPE: &str = "kubernetes";
const JOB_NAME_PREFIX: &str = "elevate-upgrade-";
const UPDATER_CONTAINER: &str = "updater";

/// Upgrades a control plane running in the local Kubernetes cluster.
#[derive(Debug, Clone)]
pub struct KubernetesUpgrader {
    config: KubernetesConfig,
    overrides: UpgradeOverrides,
}

impl KubernetesUpgrader {
    pub fn new(config: KubernetesConfig, overrides: UpgradeOverrides) -> Self {
        Self { config, overrides }
    }

    async fn wait_for_job(&self, jobs: Api<Job>, name: &str) -> Result<(), StrategyError> {
        let timeout = self.config.wait_timeout;

        let finished = tokio::time::timeout(timeout, await_condition(jobs, name, job_finished))
            .await
            .map_err(|_| StrategyError::Timeout(timeout.as_secs()))?
            .map_err(|e| StrategyError::updater_failed(format!("failed to watch job {name}: {e}")))?;

        match finished {
            Some(job) if job_failed(&job) => Err(StrategyError::updater_failed(format!(
                "job {name} failed"
            ))),
            Some(_) => Ok(()),
            None => Err(StrategyError::updater_failed(format!(
                "job {name} was deleted before finishing"
            ))),
        }
    }
}

#[async_trait]
impl UpgradeStrategy for KubernetesUpgrader {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    async fn upgrade(
        &self,
        endpoint: &Endpoint,
        license: &LicenseKey,
        version: &str,
    ) -> Result<(), StrategyError> {
        let plan = UpdaterPlan::new(
            &self.config.images,
            &self.overrides,
            ENV_TYPE,
            license,
            version,
        )?;

        let client = Client::try_default().await?;
        let jobs: Api<Job> = Api::namespaced(client, &self.config.namespace);

        let created = jobs
            .create(&PostParams::default(), &upgrade_job(&plan, &self.config))
            .await?;
        let name = created
            .metadata
            .name
            .ok_or_else(|| StrategyError::launch("job was created without a name"))?;

        tracing::info!(
            job = %name,
            namespace = %self.config.namespace,
            endpoint = %endpoint.id,
            "updater job created"
        );

        self.wait_for_job(jobs, &name).await?;

        // The updater replaces this deployment when it succeeds.
        Err(StrategyError::NotReplaced)
    }
}

/// The updater Job. It runs once: no retries, no pod restarts.
pub fn upgrade_job(plan: &UpdaterPlan, config: &KubernetesConfig) -> Job {
    let labels = BTreeMap::from([
        ("app.kubernetes.io/managed-by".to_string(), "elevate".to_string()),
        ("app.kubernetes.io/component".to_string(), "upgrade".to_string()),
    ]);

    let container = Container {
        name: UPDATER_CONTAINER.to_string(),
        image: Some(plan.updater_image.to_string()),
        args: Some(plan.args.clone()),
        ..Default::default()
    };

    Job {
        metadata: ObjectMeta {
            generate_name: Some(JOB_NAME_PREFIX.to_string()),
            namespace: Some(config.namespace.clone()),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(0),
            ttl_seconds_after_finished: Some(
                i32::try_from(config.job_ttl.as_secs()).unwrap_or(i32::MAX),
            ),
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    restart_policy: Some("Never".to_string()),
                    service_account_name: Some(config.service_account.clone()),
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn has_condition(job: &Job, condition_type: &str) -> bool {
    job.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == condition_type && c.status == "True")
        })
}

fn job_failed(job: &Job) -> bool {
    has_condition(job, "Failed")
}

/// Wait condition: the job has completed or failed.
fn job_finished(job: Option<&Job>) -> bool {
    job.is_some_and(|job| has_condition(job, "Complete") || job_failed(job))
}
