// ABOUTME: Read-only access to the endpoint inventory.
// ABOUTME: File-backed store for deployments, in-memory store for embedding and tests.

use super::model::Endpoint;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Errors from listing endpoints.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read endpoint store {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse endpoint store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Source of registered endpoint records.
///
/// Implementations return records in their listing order and never modify them.
#[async_trait]
pub trait EndpointStore: Send + Sync {
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, StoreError>;
}

/// Endpoint inventory kept in a YAML (or JSON) file, re-read on every listing.
#[derive(Debug, Clone)]
pub struct FileEndpointStore {
    path: PathBuf,
}

impl FileEndpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl EndpointStore for FileEndpointStore {
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;

        // An empty file is an empty inventory.
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_yaml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// Fixed in-memory inventory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEndpointStore {
    endpoints: Vec<Endpoint>,
}

impl MemoryEndpointStore {
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl EndpointStore for MemoryEndpointStore {
    async fn list_endpoints(&self) -> Result<Vec<Endpoint>, StoreError> {
        Ok(self.endpoints.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{EndpointId, EndpointType};

    #[tokio::test]
    async fn file_store_keeps_listing_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.yml");
        std::fs::write(
            &path,
            r#"
- id: 7
  name: cluster
  type: kubernetes_local
- id: 2
  name: engine
  type: docker
  container_engine: podman
"#,
        )
        .unwrap();

        let endpoints = FileEndpointStore::new(&path).list_endpoints().await.unwrap();
        let ids: Vec<_> = endpoints.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EndpointId(7), EndpointId(2)]);
        assert_eq!(endpoints[0].endpoint_type, EndpointType::KubernetesLocal);
    }

    #[tokio::test]
    async fn file_store_accepts_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        std::fs::write(
            &path,
            r#"[{"id": 1, "name": "local", "type": "agent_on_docker", "container_engine": "docker"}]"#,
        )
        .unwrap();

        let endpoints = FileEndpointStore::new(&path).list_endpoints().await.unwrap();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].endpoint_type, EndpointType::AgentOnDocker);
    }

    #[tokio::test]
    async fn empty_file_is_empty_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.yml");
        std::fs::write(&path, "\n").unwrap();

        let endpoints = FileEndpointStore::new(&path).list_endpoints().await.unwrap();
        assert!(endpoints.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileEndpointStore::new(dir.path().join("absent.yml"));
        assert!(matches!(
            store.list_endpoints().await,
            Err(StoreError::Read { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_endpoint_type_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endpoints.yml");
        std::fs::write(&path, "- id: 1\n  name: x\n  type: mainframe\n").unwrap();

        assert!(matches!(
            FileEndpointStore::new(&path).list_endpoints().await,
            Err(StoreError::Parse { .. })
        ));
    }
}
