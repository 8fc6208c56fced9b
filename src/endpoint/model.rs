// ABOUTME: Registered environment records as read from the endpoint store.
// ABOUTME: Includes the endpoint type tag and the Docker upgrade eligibility check.

use crate::platform::ContainerEngine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned endpoint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub u32);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of environment an endpoint record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointType {
    /// Docker engine reached directly over its API socket.
    Docker,
    /// Docker engine fronted by an agent.
    AgentOnDocker,
    Azure,
    EdgeAgentOnDocker,
    /// The Kubernetes cluster the control plane itself runs in.
    KubernetesLocal,
    AgentOnKubernetes,
    EdgeAgentOnKubernetes,
}

impl EndpointType {
    /// The store's name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointType::Docker => "docker",
            EndpointType::AgentOnDocker => "agent_on_docker",
            EndpointType::Azure => "azure",
            EndpointType::EdgeAgentOnDocker => "edge_agent_on_docker",
            EndpointType::KubernetesLocal => "kubernetes_local",
            EndpointType::AgentOnKubernetes => "agent_on_kubernetes",
            EndpointType::EdgeAgentOnKubernetes => "edge_agent_on_kubernetes",
        }
    }
}

impl fmt::Display for EndpointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One managed container environment known to the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: EndpointId,
    pub name: String,
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,
    #[serde(default)]
    pub url: String,
    /// Engine flavor behind a Docker-API endpoint, when known.
    #[serde(default)]
    pub container_engine: Option<ContainerEngine>,
}

/// How the updater should treat a Docker-API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockerEnvType {
    Standalone,
    Podman,
}

impl DockerEnvType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DockerEnvType::Standalone => "standalone",
            DockerEnvType::Podman => "podman",
        }
    }
}

impl fmt::Display for DockerEnvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Endpoint {
    /// Classify this endpoint for a Docker-platform upgrade.
    ///
    /// `None` means the endpoint is not eligible: its engine is unknown.
    pub fn docker_env_type(&self) -> Option<DockerEnvType> {
        match self.container_engine? {
            ContainerEngine::Docker => Some(DockerEnvType::Standalone),
            ContainerEngine::Podman => Some(DockerEnvType::Podman),
        }
    }
}
