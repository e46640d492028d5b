use std::collections::HashSet;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

use aws_sdk_s3::types::ServerSideEncryption;
use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;
pub mod token;

pub const DIRECTORY_MARKER_SUFFIX: char = '/';

pub const DEFAULT_SSE: &str = "aws:kms";
pub const DEFAULT_SSE_KMS_KEY_ID: &str = "alias/aws/s3";

/// Every full key found at one location. Membership is an exact match on the full key.
pub type ObjectKeySet = HashSet<String>;

pub fn is_directory_marker(key: &str) -> bool {
    key.ends_with(DIRECTORY_MARKER_SUFFIX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub prefix: Option<String>,
}

impl S3Location {
    pub fn new(bucket: &str, prefix: Option<&str>) -> Self {
        Self {
            bucket: bucket.to_string(),
            prefix: prefix
                .filter(|prefix| !prefix.is_empty())
                .map(|prefix| prefix.to_string()),
        }
    }

    /// The prefix as a string, empty when the whole bucket is addressed.
    pub fn prefix_str(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }
}

impl Display for S3Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.prefix_str())
    }
}

/// An object as returned by a listing. Only `key` takes part in the diff.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub e_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CopyTask {
    pub source_key: String,
    pub target_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SseConfig {
    pub sse: ServerSideEncryption,
    pub sse_kms_key_id: SseKmsKeyId,
}

impl SseConfig {
    pub fn is_kms(&self) -> bool {
        matches!(
            self.sse,
            ServerSideEncryption::AwsKms | ServerSideEncryption::AwsKmsDsse
        )
    }
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            sse: ServerSideEncryption::AwsKms,
            sse_kms_key_id: SseKmsKeyId {
                id: Some(DEFAULT_SSE_KMS_KEY_ID.to_string()),
            },
        }
    }
}

#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct SseKmsKeyId {
    pub id: Option<String>,
}

impl Debug for SseKmsKeyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("SseKmsKeyId");
        let sse_kms_key_id = self.id.as_ref().map_or("None", |_| "** redacted **");
        keys.field("sse_kms_key_id", &sse_kms_key_id);
        keys.finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedKey {
    pub source_key: String,
    pub target_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedKey {
    pub key: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Succeeded,
    PartiallySucceeded,
    Failed,
}

/// Outcome of one sync call.
///
/// A key is either copied, failed, or not attempted because the sync was cancelled.
/// Keys that did not need a copy are only counted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncResult {
    pub copied: Vec<CopiedKey>,
    pub failed: Vec<FailedKey>,
    pub directory_markers: usize,
    pub already_present: usize,
    pub skipped_in_target_location: usize,
    pub not_attempted: usize,
    pub dry_run: bool,
}

impl SyncResult {
    pub fn status(&self) -> SyncStatus {
        let incomplete = self.failed.len() + self.not_attempted;
        if incomplete == 0 {
            SyncStatus::Succeeded
        } else if self.copied.is_empty() {
            SyncStatus::Failed
        } else {
            SyncStatus::PartiallySucceeded
        }
    }

    pub fn copied_count(&self) -> usize {
        self.copied.len()
    }

    pub fn failed_keys(&self) -> Vec<&str> {
        self.failed.iter().map(|failed| failed.key.as_str()).collect()
    }

    pub fn summary(&self) -> SyncSummary {
        SyncSummary {
            status: self.status(),
            copied_count: self.copied_count(),
            failed_keys: self
                .failed
                .iter()
                .map(|failed| failed.key.to_string())
                .collect(),
            skipped_directory_markers: self.directory_markers,
            already_present: self.already_present,
            skipped_in_target_location: self.skipped_in_target_location,
            not_attempted: self.not_attempted,
            dry_run: self.dry_run,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub status: SyncStatus,
    pub copied_count: usize,
    pub failed_keys: Vec<String>,
    pub skipped_directory_markers: usize,
    pub already_present: usize,
    pub skipped_in_target_location: usize,
    pub not_attempted: usize,
    pub dry_run: bool,
}
