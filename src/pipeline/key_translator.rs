use crate::types::S3Location;
use crate::types::error::S3mirrorError;

/// Maps a source key to its target key by swapping the leading source prefix for the target prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTranslator {
    source_prefix: String,
    target_prefix: String,
}

impl KeyTranslator {
    pub fn new(source_prefix: Option<&str>, target_prefix: Option<&str>) -> Self {
        Self {
            source_prefix: source_prefix.unwrap_or_default().to_string(),
            target_prefix: target_prefix.unwrap_or_default().to_string(),
        }
    }

    pub fn from_locations(source: &S3Location, target: &S3Location) -> Self {
        Self::new(source.prefix.as_deref(), target.prefix.as_deref())
    }

    pub fn translate(&self, source_key: &str) -> Result<String, S3mirrorError> {
        // Only the leading occurrence is replaced.
        let relative_key = source_key.strip_prefix(&self.source_prefix).ok_or_else(|| {
            S3mirrorError::KeyOutsidePrefix {
                key: source_key.to_string(),
                prefix: self.source_prefix.to_string(),
            }
        })?;

        let target_key = format!("{}{}", self.target_prefix, relative_key);
        if target_key.is_empty() {
            return Err(S3mirrorError::EmptyTargetKey {
                key: source_key.to_string(),
            });
        }

        Ok(target_key)
    }
}
