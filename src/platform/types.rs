// ABOUTME: Platform and container engine type definitions.
// ABOUTME: Includes the Platform enum, ContainerEngine enum, and EngineSocket struct.

use serde::{Deserialize, Serialize};

/// The deployment topology the control plane is running under.
///
/// Detection only ever yields `Docker` or `Kubernetes`. `Unknown` is the
/// value a coordinator carries when it was built without a detected
/// platform; resolution and dispatch both reject it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Docker,
    Kubernetes,
    Unknown,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Docker => write!(f, "docker"),
            Platform::Kubernetes => write!(f, "kubernetes"),
            Platform::Unknown => write!(f, "unknown"),
        }
    }
}

/// The container engine behind a Docker-API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerEngine {
    Docker,
    Podman,
}

impl std::fmt::Display for ContainerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerEngine::Docker => write!(f, "docker"),
            ContainerEngine::Podman => write!(f, "podman"),
        }
    }
}

/// A container engine socket found on the local system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSocket {
    /// The engine serving the socket.
    pub engine: ContainerEngine,
    /// Path to the unix socket.
    pub path: String,
}
