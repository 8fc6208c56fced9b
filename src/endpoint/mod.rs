// ABOUTME: Endpoint records, the read-only store seam, and local endpoint resolution.
// ABOUTME: The upgrade path reads endpoints but never writes them back.

mod model;
mod resolver;
mod store;

pub use model::{DockerEnvType, Endpoint, EndpointId, EndpointType};
pub use resolver::{
    ResolveError, is_local_candidate, local_endpoint_types, resolve_local_endpoint,
};
pub use store::{EndpointStore, FileEndpointStore, MemoryEndpointStore, StoreError};
