// ABOUTME: Local endpoint resolution: which registered endpoint is this instance itself.
// ABOUTME: First match in store order among the endpoint types valid for the platform.

use super::model::{Endpoint, EndpointType};
use crate::platform::Platform;

/// Errors from resolving the local endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to determine endpoint type: unsupported platform {0}")]
    UnsupportedPlatform(Platform),

    #[error("failed to find local endpoint")]
    LocalEndpointNotFound,
}

const DOCKER_LOCAL_TYPES: &[EndpointType] = &[EndpointType::AgentOnDocker, EndpointType::Docker];
const KUBERNETES_LOCAL_TYPES: &[EndpointType] = &[EndpointType::KubernetesLocal];

/// Endpoint types that can represent the local instance on a platform.
pub fn local_endpoint_types(platform: Platform) -> Option<&'static [EndpointType]> {
    match platform {
        Platform::Docker => Some(DOCKER_LOCAL_TYPES),
        Platform::Kubernetes => Some(KUBERNETES_LOCAL_TYPES),
        Platform::Unknown => None,
    }
}

/// Whether `endpoint` can represent the local instance on `platform`.
///
/// Its type must be one of [`local_endpoint_types`], and on Docker it must
/// also have an upgrade classification ([`Endpoint::docker_env_type`]).
pub fn is_local_candidate(endpoint: &Endpoint, platform: Platform) -> bool {
    let Some(types) = local_endpoint_types(platform) else {
        return false;
    };

    types.contains(&endpoint.endpoint_type)
        && (platform != Platform::Docker || endpoint.docker_env_type().is_some())
}

/// Find the endpoint representing the local instance.
///
/// Endpoints are scanned in the order given and the first acceptable one
/// wins; there is no further tie-break between several acceptable endpoints.
/// On Docker an endpoint must also have an upgrade classification
/// ([`Endpoint::docker_env_type`]); unclassified endpoints are skipped.
pub fn resolve_local_endpoint(
    endpoints: &[Endpoint],
    platform: Platform,
) -> Result<&Endpoint, ResolveError> {
    let types =
        local_endpoint_types(platform).ok_or(ResolveError::UnsupportedPlatform(platform))?;

    for endpoint in endpoints {
        if !types.contains(&endpoint.endpoint_type) {
            continue;
        }

        if !is_local_candidate(endpoint, platform) {
            tracing::warn!(
                endpoint = %endpoint.id,
                name = %endpoint.name,
                "skipping Docker endpoint with unknown container engine"
            );
            continue;
        }

        tracing::debug!(endpoint = %endpoint.id, name = %endpoint.name, %platform, "resolved local endpoint");
        return Ok(endpoint);
    }

    Err(ResolveError::LocalEndpointNotFound)
}
