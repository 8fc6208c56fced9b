// ABOUTME: Configuration types and parsing for elevate.yml.
// ABOUTME: Handles YAML parsing, file discovery, and defaults for every section.

mod init;

pub use init::init_config;

use crate::error::{Error, Result};
use crate::types::ImageRef;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "elevate.yml";
pub const CONFIG_FILENAME_ALT: &str = "elevate.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".elevate/config.yml";

pub const DEFAULT_IMAGE_PREFIX: &str = "elevate/control-plane-ee";
pub const DEFAULT_UPDATER_IMAGE: &str = "elevate/updater:latest";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Control-plane version the upgrade installs.
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub docker: DockerConfig,

    #[serde(default)]
    pub kubernetes: KubernetesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// YAML or JSON endpoint inventory.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

/// Images the updater works with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,
    #[serde(default = "default_updater_image")]
    pub updater_image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DockerConfig {
    /// Engine socket; defaults to the endpoint engine's standard socket.
    #[serde(default)]
    pub socket: Option<String>,

    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub wait_timeout: Duration,

    #[serde(flatten)]
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KubernetesConfig {
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_service_account")]
    pub service_account: String,

    /// How long a finished updater job is kept.
    #[serde(default = "default_job_ttl", with = "humantime_serde")]
    pub job_ttl: Duration,

    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub wait_timeout: Duration,

    #[serde(flatten)]
    pub images: ImageConfig,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("endpoints.yml")
}

fn default_image_prefix() -> String {
    DEFAULT_IMAGE_PREFIX.to_string()
}

fn default_updater_image() -> String {
    DEFAULT_UPDATER_IMAGE.to_string()
}

fn default_wait_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_namespace() -> String {
    "elevate".to_string()
}

fn default_service_account() -> String {
    "elevate-sa-clusteradmin".to_string()
}

fn default_job_ttl() -> Duration {
    Duration::from_secs(300)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            image_prefix: default_image_prefix(),
            updater_image: default_updater_image(),
        }
    }
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            socket: None,
            wait_timeout: default_wait_timeout(),
            images: ImageConfig::default(),
        }
    }
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            service_account: default_service_account(),
            job_ttl: default_job_ttl(),
            wait_timeout: default_wait_timeout(),
            images: ImageConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            version: default_version(),
            store: StoreConfig::default(),
            docker: DockerConfig::default(),
            kubernetes: KubernetesConfig::default(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;

        // Relative store paths are relative to the config file.
        if config.store.path.is_relative()
            && let Some(parent) = path.parent()
        {
            config.store.path = parent.join(&config.store.path);
        }

        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::InvalidConfig("version cannot be empty".to_string()));
        }

        // Every section must build valid image references for `version`.
        let sections = [
            ("docker", &self.docker.images),
            ("kubernetes", &self.kubernetes.images),
        ];
        for (section, images) in sections {
            ImageRef::versioned(&images.image_prefix, &self.version).map_err(|e| {
                Error::InvalidConfig(format!("{section}.image_prefix/version: {e}"))
            })?;
            ImageRef::parse(&images.updater_image)
                .map_err(|e| Error::InvalidConfig(format!("{section}.updater_image: {e}")))?;
        }

        if self.kubernetes.namespace.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "kubernetes.namespace cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
