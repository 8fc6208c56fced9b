// ABOUTME: Config scaffolding for new installations.
// ABOUTME: Creates an elevate.yml template with every section at its default.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::default());
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"# Address the upgrade API listens on
listen: {listen}
# Control-plane version the upgrade installs
version: "{version}"

store:
  # Endpoint inventory (YAML or JSON list)
  path: {store}

docker:
  # Engine socket (default: the endpoint engine's standard socket)
  # socket: /var/run/docker.sock
  wait_timeout: 10m
  image_prefix: {docker_prefix}
  updater_image: {docker_updater}

kubernetes:
  namespace: {namespace}
  service_account: {service_account}
  job_ttl: 5m
  wait_timeout: 10m
  image_prefix: {kube_prefix}
  updater_image: {kube_updater}
"#,
        listen = config.listen,
        version = config.version,
        store = config.store.path.display(),
        docker_prefix = config.docker.images.image_prefix,
        docker_updater = config.docker.images.updater_image,
        namespace = config.kubernetes.namespace,
        service_account = config.kubernetes.service_account,
        kube_prefix = config.kubernetes.images.image_prefix,
        kube_updater = config.kubernetes.images.updater_image,
    )
}
