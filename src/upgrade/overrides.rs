// ABOUTME: Environment overrides read by the upgrade strategies.
// ABOUTME: Lets operators test pre-release images, local images, or a different updater.

/// Image repository of the edition to install, replacing the configured prefix.
pub const IMAGE_PREFIX_ENV: &str = "UPGRADE_IMAGE_PREFIX";
/// Any non-empty value: inspect the target image instead of pulling it.
pub const SKIP_PULL_IMAGE_ENV: &str = "UPGRADE_SKIP_PULL_IMAGE";
/// Updater image, replacing the configured one.
pub const UPDATER_IMAGE_ENV: &str = "UPGRADE_UPDATER_IMAGE";

/// Overrides captured from the environment. Empty variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpgradeOverrides {
    pub image_prefix: Option<String>,
    pub skip_pull_image: bool,
    pub updater_image: Option<String>,
}

impl UpgradeOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            image_prefix: non_empty(IMAGE_PREFIX_ENV),
            skip_pull_image: non_empty(SKIP_PULL_IMAGE_ENV).is_some(),
            updater_image: non_empty(UPDATER_IMAGE_ENV),
        }
    }
}
