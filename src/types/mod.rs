// ABOUTME: Validated domain types shared across the upgrade path.
// ABOUTME: License keys are checked once at the edge and carried as a newtype afterwards.

mod image_ref;
mod license;

pub use image_ref::{ImageRef, ParseImageRefError};
pub use license::{LicenseError, LicenseKey};
