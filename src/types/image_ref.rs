// ABOUTME: Image references for the control-plane and updater images.
// ABOUTME: Splits `repository[:tag]` and builds version-tagged references from a prefix.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("image prefix must not carry a tag or digest: {0}")]
    TaggedPrefix(String),

    #[error("invalid image tag: {0:?}")]
    InvalidTag(String),
}

/// Registries cap tags at 128 characters.
const MAX_TAG_LEN: usize = 128;

/// An image reference as handed to the engine or cluster.
///
/// Digests are not supported; the upgrade path always addresses images by
/// tag, and the tag defaults to `latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    repository: String,
    tag: String,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = validate(input)?;

        // A colon followed by a slash belongs to a registry port, not a tag.
        match input.rsplit_once(':') {
            Some((repository, tag)) if !tag.contains('/') => Ok(Self {
                repository: repository.to_string(),
                tag: validate_tag(tag)?.to_string(),
            }),
            _ => Ok(Self {
                repository: input.to_string(),
                tag: "latest".to_string(),
            }),
        }
    }

    /// Build `<prefix>:<version>`. The prefix is a bare repository.
    pub fn versioned(prefix: &str, version: &str) -> Result<Self, ParseImageRefError> {
        let repository = validate(prefix)?;
        if repository.contains('@') || Self::parse(repository)?.repository != repository {
            return Err(ParseImageRefError::TaggedPrefix(repository.to_string()));
        }

        Ok(Self {
            repository: repository.to_string(),
            tag: validate_tag(version)?.to_string(),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

fn validate(input: &str) -> Result<&str, ParseImageRefError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ParseImageRefError::Empty);
    }

    if let Some(c) = input
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '/' | ':' | '.' | '-' | '_' | '@'))
    {
        return Err(ParseImageRefError::InvalidChar(c));
    }

    Ok(input)
}

/// Tags are `[A-Za-z0-9_][A-Za-z0-9_.-]*`, at most 128 characters.
fn validate_tag(tag: &str) -> Result<&str, ParseImageRefError> {
    let mut chars = tag.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && tag.len() <= MAX_TAG_LEN;

    if valid {
        Ok(tag)
    } else {
        Err(ParseImageRefError::InvalidTag(tag.to_string()))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
