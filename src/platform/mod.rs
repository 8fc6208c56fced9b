// ABOUTME: Deployment platform detection for Docker and Kubernetes.
// ABOUTME: Also locates the local container engine socket used by the Docker upgrader.

mod detection;
mod types;

pub use detection::{
    DetectionError, Environment, PlatformDetector, SystemDetector, SystemEnvironment,
    default_socket_path, detect_engine_socket,
};
pub use types::{ContainerEngine, EngineSocket, Platform};
