// ABOUTME: License key validation for upgrade requests.
// ABOUTME: Accepts keys shaped `<digit>-<suffix>`; never contacts a licensing authority.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LicenseError {
    #[error("license is missing")]
    MissingLicense,

    #[error("license is invalid")]
    InvalidLicenseFormat,
}

/// A syntactically valid license key.
///
/// The shape is a single leading ASCII digit (the edition), a `-`, then at
/// least one more character. Nothing beyond the shape is checked.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseKey(String);

impl LicenseKey {
    pub fn new(value: &str) -> Result<Self, LicenseError> {
        if value.is_empty() {
            return Err(LicenseError::MissingLicense);
        }

        let mut chars = value.chars();
        let edition = chars.next().filter(char::is_ascii_digit);
        let separator = chars.next().filter(|c| *c == '-');
        let suffix = chars.next().filter(|c| *c != '\n');

        if edition.is_none() || separator.is_none() || suffix.is_none() {
            return Err(LicenseError::InvalidLicenseFormat);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The leading edition digit.
    pub fn edition(&self) -> u8 {
        // Validated in `new`: the first byte is an ASCII digit.
        self.0.as_bytes()[0] - b'0'
    }
}

// Keys end up in logs through `{:?}` on request types; only the edition is shown.
impl fmt::Debug for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LicenseKey({}-***)", self.edition())
    }
}
