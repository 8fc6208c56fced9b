// ABOUTME: End-to-end tests for the upgrade request path.
// ABOUTME: Validation, detection, store listing, resolution and dispatch over test doubles.

mod support;

use elevate::endpoint::{EndpointId, EndpointType, FileEndpointStore};
use elevate::platform::{ContainerEngine, DetectionError, Platform};
use elevate::upgrade::{SystemUpgrade, SystemUpgradeErrorKind, UpgradeCoordinator};
use std::sync::Arc;
use support::{CountingDetector, Harness, RecordedCall, RecordingStrategy, endpoint};

#[tokio::test]
async fn docker_upgrade_reaches_docker_strategy_once() {
    support::init_tracing();
    let harness = Harness::new(
        Platform::Docker,
        vec![endpoint(1, EndpointType::AgentOnDocker, Some(ContainerEngine::Docker))],
    );

    harness.system.upgrade("1-ABCDEF").await.unwrap();

    assert_eq!(
        harness.docker.calls(),
        vec![RecordedCall {
            endpoint: EndpointId(1),
            license: "1-ABCDEF".to_string(),
            version: "2.21.0".to_string(),
        }]
    );
    assert!(harness.kubernetes.calls().is_empty());
}

#[tokio::test]
async fn kubernetes_upgrade_reaches_kubernetes_strategy_once() {
    let harness = Harness::new(
        Platform::Kubernetes,
        vec![endpoint(6, EndpointType::KubernetesLocal, None)],
    );

    harness.system.upgrade("9-x").await.unwrap();

    let calls = harness.kubernetes.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, EndpointId(6));
    assert_eq!(calls[0].license, "9-x");
    assert!(harness.docker.calls().is_empty());
}

#[tokio::test]
async fn bad_license_is_rejected_before_detection_or_store() {
    let harness = Harness::new(
        Platform::Docker,
        vec![endpoint(1, EndpointType::AgentOnDocker, Some(ContainerEngine::Docker))],
    );

    let err = harness.system.upgrade("bad").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::InvalidLicenseFormat);
    assert_eq!(harness.detector.calls(), 0);
    assert_eq!(harness.store.calls(), 0);
    assert!(harness.docker.calls().is_empty());
    assert!(harness.system.coordinator().state().is_idle());
}

#[tokio::test]
async fn empty_license_is_missing() {
    let harness = Harness::new(Platform::Kubernetes, vec![]);

    let err = harness.system.upgrade("").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::MissingLicense);
    assert_eq!(harness.detector.calls(), 0);
}

#[tokio::test]
async fn undetermined_platform_fails_before_store() {
    let harness = Harness::new(Platform::Unknown, vec![]);

    let err = harness.system.upgrade("1-ABC").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::PlatformUndetermined);
    assert_eq!(harness.detector.calls(), 1);
    assert_eq!(harness.store.calls(), 0);
}

#[tokio::test]
async fn missing_local_endpoint_leaves_coordinator_idle() {
    let harness = Harness::new(
        Platform::Docker,
        vec![endpoint(1, EndpointType::KubernetesLocal, None)],
    );

    let err = harness.system.upgrade("1-ABC").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::LocalEndpointNotFound);
    assert!(harness.system.coordinator().state().is_idle());
    assert!(harness.docker.calls().is_empty());
}

#[tokio::test]
async fn second_request_is_already_in_progress() {
    let harness = Harness::new(
        Platform::Kubernetes,
        vec![endpoint(1, EndpointType::KubernetesLocal, None)],
    );

    harness.system.upgrade("9-x").await.unwrap();
    let err = harness.system.upgrade("9-x").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::UpgradeAlreadyInProgress);
    assert_eq!(harness.kubernetes.calls().len(), 1);
}

#[tokio::test]
async fn strategy_failure_is_reported() {
    let harness = Harness::with_strategies(
        Platform::Docker,
        vec![endpoint(1, EndpointType::Docker, Some(ContainerEngine::Podman))],
        RecordingStrategy::failing(),
        RecordingStrategy::new(),
    );

    let err = harness.system.upgrade("1-ABC").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::StrategyFailed);
    assert!(err.strategy_error().is_some());
    assert_eq!(
        err.to_string(),
        "failed to upgrade: failed to launch updater: engine unreachable"
    );
}

#[tokio::test]
async fn unreadable_store_is_store_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let strategy = RecordingStrategy::new();
    let coordinator = Arc::new(UpgradeCoordinator::new(
        Platform::Docker,
        "2.21.0",
        strategy.clone(),
        strategy.clone(),
    ));
    let system = SystemUpgrade::new(
        CountingDetector::new(Ok(Platform::Docker)),
        Arc::new(FileEndpointStore::new(dir.path().join("missing.yml"))),
        coordinator,
    );

    let err = system.upgrade("1-ABC").await.unwrap_err();

    assert_eq!(err.kind(), SystemUpgradeErrorKind::StoreUnavailable);
    assert!(strategy.calls().is_empty());
}

#[tokio::test]
async fn file_store_inventory_is_resolved_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("endpoints.yml");
    std::fs::write(
        &path,
        r#"
- id: 1
  name: cluster
  type: kubernetes_local
- id: 2
  name: local
  type: agent_on_docker
  container_engine: docker
- id: 3
  name: other
  type: docker
  container_engine: docker
"#,
    )
    .unwrap();

    let strategy = RecordingStrategy::new();
    let coordinator = Arc::new(UpgradeCoordinator::new(
        Platform::Docker,
        "2.21.0",
        strategy.clone(),
        RecordingStrategy::new(),
    ));
    let system = SystemUpgrade::new(
        CountingDetector::new(Ok(Platform::Docker)),
        Arc::new(FileEndpointStore::new(path)),
        coordinator,
    );

    let local = system.guess_local_endpoint().await.unwrap();
    assert_eq!(local.id, EndpointId(2));

    system.upgrade("1-ABC").await.unwrap();
    assert_eq!(strategy.calls()[0].endpoint, EndpointId(2));
}

#[tokio::test]
async fn ambiguous_detection_is_undetermined() {
    let strategy = RecordingStrategy::new();
    let coordinator = Arc::new(UpgradeCoordinator::new(
        Platform::Docker,
        "2.21.0",
        strategy.clone(),
        strategy.clone(),
    ));
    let system = SystemUpgrade::new(
        CountingDetector::new(Err(DetectionError::Ambiguous)),
        support::CountingStore::new(vec![]),
        coordinator,
    );

    let err = system.guess_local_endpoint().await.unwrap_err();
    assert_eq!(err.kind(), SystemUpgradeErrorKind::PlatformUndetermined);
}

#[tokio::test]
async fn platform_drift_is_rejected_before_admission() {
    let docker = RecordingStrategy::failing();
    let kubernetes = RecordingStrategy::new();
    let coordinator = Arc::new(UpgradeCoordinator::new(
        Platform::Docker,
        "2.21.0",
        docker.clone(),
        kubernetes.clone(),
    ));
    let system = SystemUpgrade::new(
        CountingDetector::new(Ok(Platform::Kubernetes)),
        support::CountingStore::new(vec![endpoint(4, EndpointType::KubernetesLocal, None)]),
        coordinator,
    );

    let err = system.upgrade("1-ABC").await.unwrap_err();
    assert_eq!(err.kind(), SystemUpgradeErrorKind::EndpointPlatformMismatch);
    assert!(docker.calls().is_empty());
    assert!(kubernetes.calls().is_empty());
    assert!(system.coordinator().state().is_idle());

    // Still idle: a later request reports the same mismatch, not "in progress".
    let again = system.upgrade("1-ABC").await.unwrap_err();
    assert_eq!(again.kind(), SystemUpgradeErrorKind::EndpointPlatformMismatch);
}
