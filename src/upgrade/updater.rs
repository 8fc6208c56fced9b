// ABOUTME: The updater launch plan shared by the Docker and Kubernetes strategies.
// ABOUTME: Resolves images from config plus env overrides and builds the updater's arguments.

use super::overrides::UpgradeOverrides;
use super::strategy::StrategyError;
use crate::config::ImageConfig;
use crate::types::{ImageRef, LicenseKey};

/// Everything the updater needs to replace the running control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterPlan {
    /// The control-plane image to install.
    pub image: ImageRef,
    /// The image that performs the replacement.
    pub updater_image: ImageRef,
    /// Inspect `image` instead of pulling it.
    pub skip_pull: bool,
    /// Arguments handed to the updater.
    pub args: Vec<String>,
}

impl UpdaterPlan {
    /// Overrides win over the configured images.
    pub fn new(
        images: &ImageConfig,
        overrides: &UpgradeOverrides,
        env_type: &str,
        license: &LicenseKey,
        version: &str,
    ) -> Result<Self, StrategyError> {
        let prefix = overrides
            .image_prefix
            .as_deref()
            .unwrap_or(&images.image_prefix);
        let updater = overrides
            .updater_image
            .as_deref()
            .unwrap_or(&images.updater_image);

        let image = ImageRef::versioned(prefix, version)?;
        let updater_image = ImageRef::parse(updater)?;
        let skip_pull = overrides.skip_pull_image;

        let mut args = vec![
            "control-plane".to_string(),
            "--env-type".to_string(),
            env_type.to_string(),
            "--image".to_string(),
            image.to_string(),
            "--license".to_string(),
            license.as_str().to_string(),
        ];
        if skip_pull {
            args.push("--skip-pull-image".to_string());
        }

        Ok(Self {
            image,
            updater_image,
            skip_pull,
            args,
        })
    }
}
