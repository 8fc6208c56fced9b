// ABOUTME: Deployment platform detection for the local execution context.
// ABOUTME: Kubernetes is signalled by the in-cluster env/service account, Docker by an engine socket.

use super::types::{ContainerEngine, EngineSocket, Platform};
use std::path::Path;

const KUBERNETES_SERVICE_HOST: &str = "KUBERNETES_SERVICE_HOST";
const SERVICE_ACCOUNT_TOKEN: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
const DOCKER_ENV_MARKER: &str = "/.dockerenv";
const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Error during platform detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DetectionError {
    #[error("no Kubernetes or container engine signal found")]
    NoSignal,

    #[error("both Kubernetes and container engine signals are present")]
    Ambiguous,
}

/// The parts of the process environment detection looks at.
pub trait Environment: Send + Sync {
    /// Look up an environment variable.
    fn var(&self, key: &str) -> Option<String>;

    /// Check whether a filesystem path exists.
    fn path_exists(&self, path: &Path) -> bool;

    /// The current user id, used to locate rootless Podman sockets.
    fn uid(&self) -> Option<String> {
        self.var("UID")
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn uid(&self) -> Option<String> {
        self.var("UID").or_else(|| {
            // Fall back to reading /proc/self/status
            std::fs::read_to_string("/proc/self/status")
                .ok()
                .and_then(|s| {
                    s.lines()
                        .find(|l| l.starts_with("Uid:"))
                        .and_then(|l| l.split_whitespace().nth(1))
                        .map(|s| s.to_string())
                })
        })
    }
}

/// Classifies the execution context into a [`Platform`].
pub trait PlatformDetector: Send + Sync {
    /// Must be deterministic for a fixed environment and free of side effects.
    fn determine_container_platform(&self) -> Result<Platform, DetectionError>;
}

/// Detector backed by an [`Environment`].
#[derive(Debug, Clone, Default)]
pub struct SystemDetector<E = SystemEnvironment> {
    env: E,
}

impl<E: Environment> SystemDetector<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    fn kubernetes_signal(&self) -> bool {
        self.env
            .var(KUBERNETES_SERVICE_HOST)
            .is_some_and(|host| !host.trim().is_empty())
            || self.env.path_exists(Path::new(SERVICE_ACCOUNT_TOKEN))
    }

    fn docker_signal(&self) -> bool {
        detect_engine_socket(&self.env).is_some()
            || self.env.path_exists(Path::new(DOCKER_ENV_MARKER))
    }
}

impl<E: Environment> PlatformDetector for SystemDetector<E> {
    fn determine_container_platform(&self) -> Result<Platform, DetectionError> {
        let kubernetes = self.kubernetes_signal();
        let docker = self.docker_signal();
        tracing::debug!(kubernetes, docker, "platform signals");

        match (kubernetes, docker) {
            (true, false) => Ok(Platform::Kubernetes),
            (false, true) => Ok(Platform::Docker),
            (true, true) => Err(DetectionError::Ambiguous),
            (false, false) => Err(DetectionError::NoSignal),
        }
    }
}

/// Find a container engine socket on the local system.
///
/// Detection order:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_engine_socket(env: &impl Environment) -> Option<EngineSocket> {
    // 1. Rootless Podman
    if let Some(uid) = env.uid() {
        let rootless_socket = format!("/run/user/{}/podman/podman.sock", uid);
        if env.path_exists(Path::new(&rootless_socket)) {
            return Some(EngineSocket {
                engine: ContainerEngine::Podman,
                path: rootless_socket,
            });
        }
    }

    // 2. Rootful Podman
    if env.path_exists(Path::new(ROOTFUL_PODMAN)) {
        return Some(EngineSocket {
            engine: ContainerEngine::Podman,
            path: ROOTFUL_PODMAN.to_string(),
        });
    }

    // 3. Docker
    if env.path_exists(Path::new(DOCKER_SOCKET)) {
        return Some(EngineSocket {
            engine: ContainerEngine::Docker,
            path: DOCKER_SOCKET.to_string(),
        });
    }

    None
}

/// The socket an engine listens on when nothing else is configured.
pub fn default_socket_path(engine: ContainerEngine) -> String {
    match engine {
        ContainerEngine::Docker => DOCKER_SOCKET.to_string(),
        ContainerEngine::Podman => ROOTFUL_PODMAN.to_string(),
    }
}
