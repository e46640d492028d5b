//! An in-memory object store.
//!
//! Buckets and objects live in sorted maps, so listings come back in key order like S3.
//! Listing and copy failures can be injected per bucket and per source key.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use aws_sdk_s3::types::ServerSideEncryption;
use chrono::{DateTime, Utc};

use crate::storage::{CopyObjectRequest, ListObjectsPage, StorageTrait};
use crate::types::ObjectRecord;
use crate::types::error::S3mirrorError;

const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub size: i64,
    pub last_modified: DateTime<Utc>,
    pub e_tag: String,
    pub sse: Option<ServerSideEncryption>,
    pub sse_kms_key_id: Option<String>,
}

#[derive(Debug, Clone)]
struct CopyFailure {
    error: S3mirrorError,
    // None fails forever.
    remaining: Option<usize>,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, BTreeMap<String, StoredObject>>,
    listing_failures: HashMap<String, S3mirrorError>,
    copy_failures: HashMap<String, CopyFailure>,
    copy_requests: Vec<CopyObjectRequest>,
    list_page_requests: usize,
}

#[derive(Clone)]
pub struct InMemoryStorage {
    state: Arc<Mutex<State>>,
    page_size: usize,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Caps every listing page, regardless of the `max_keys` requested.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.lock()
            .buckets
            .entry(bucket.to_string())
            .or_default();
    }

    /// Puts an object, creating the bucket if necessary.
    pub fn put_object(&self, bucket: &str, key: &str, size: i64) {
        let object = StoredObject {
            size,
            last_modified: Utc::now(),
            e_tag: format!("\"{:032x}\"", size),
            sse: None,
            sse_kms_key_id: None,
        };

        self.lock()
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(key.to_string(), object);
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.lock()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key).cloned())
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn fail_listing(&self, bucket: &str, error: S3mirrorError) {
        self.lock()
            .listing_failures
            .insert(bucket.to_string(), error);
    }

    /// Every copy whose source key is `source_key` fails with `error`.
    pub fn fail_copy(&self, source_key: &str, error: S3mirrorError) {
        self.lock().copy_failures.insert(
            source_key.to_string(),
            CopyFailure {
                error,
                remaining: None,
            },
        );
    }

    /// The first `attempts` copies of `source_key` fail with `error`, later ones go through.
    pub fn fail_copy_times(&self, source_key: &str, error: S3mirrorError, attempts: usize) {
        self.lock().copy_failures.insert(
            source_key.to_string(),
            CopyFailure {
                error,
                remaining: Some(attempts),
            },
        );
    }

    /// Every copy request received, including failed ones.
    pub fn copy_requests(&self) -> Vec<CopyObjectRequest> {
        self.lock().copy_requests.clone()
    }

    pub fn list_page_requests(&self) -> usize {
        self.lock().list_page_requests
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means another test thread panicked while holding it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StorageTrait for InMemoryStorage {
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
        max_keys: i32,
    ) -> Result<ListObjectsPage> {
        let mut state = self.lock();
        state.list_page_requests += 1;

        if let Some(error) = state.listing_failures.get(bucket) {
            return Err(anyhow!(error.clone()));
        }

        let objects = state
            .buckets
            .get(bucket)
            .ok_or_else(|| anyhow!(S3mirrorError::NoSuchBucket(bucket.to_string())))?;

        let prefix = prefix.unwrap_or("");
        let page_size = self.page_size.min(max_keys.max(1) as usize);

        let mut matched = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .filter(|(key, _)| {
                continuation_token
                    .as_ref()
                    .is_none_or(|token| key.as_str() > token.as_str())
            });

        let page = matched
            .by_ref()
            .take(page_size)
            .map(|(key, object)| ObjectRecord {
                key: key.to_string(),
                size: object.size,
                last_modified: Some(object.last_modified),
                e_tag: Some(object.e_tag.to_string()),
            })
            .collect::<Vec<_>>();
        let is_truncated = matched.next().is_some();

        Ok(ListObjectsPage {
            next_continuation_token: if is_truncated {
                page.last().map(|object| object.key.to_string())
            } else {
                None
            },
            objects: page,
            is_truncated,
        })
    }

    async fn copy_object(&self, request: &CopyObjectRequest) -> Result<()> {
        let mut state = self.lock();
        state.copy_requests.push(request.clone());

        if let Some(failure) = state.copy_failures.get_mut(&request.source_key) {
            match failure.remaining.as_mut() {
                None => return Err(anyhow!(failure.error.clone())),
                Some(0) => {}
                Some(remaining) => {
                    *remaining -= 1;
                    return Err(anyhow!(failure.error.clone()));
                }
            }
        }

        let source = state
            .buckets
            .get(&request.source_bucket)
            .ok_or_else(|| anyhow!(S3mirrorError::NoSuchBucket(request.source_bucket.clone())))?
            .get(&request.source_key)
            .ok_or_else(|| anyhow!(S3mirrorError::ObjectNotFound))?;

        let copied = StoredObject {
            size: source.size,
            last_modified: Utc::now(),
            e_tag: source.e_tag.to_string(),
            sse: Some(request.sse.sse.clone()),
            sse_kms_key_id: if request.sse.is_kms() {
                request.sse.sse_kms_key_id.id.clone()
            } else {
                None
            },
        };

        state
            .buckets
            .get_mut(&request.target_bucket)
            .ok_or_else(|| anyhow!(S3mirrorError::NoSuchBucket(request.target_bucket.clone())))?
            .insert(request.target_key.to_string(), copied);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SseConfig;

    #[tokio::test]
    async fn list_in_pages() {
        let storage = InMemoryStorage::new().with_page_size(2);
        for key in ["dir1/data1", "dir1/data2", "dir1/data3", "dir2/data1"] {
            storage.put_object("bucket1", key, 1);
        }

        let first = storage
            .list_objects_page("bucket1", Some("dir1/"), None, 1000)
            .await
            .unwrap();
        assert_eq!(
            first
                .objects
                .iter()
                .map(|object| object.key.as_str())
                .collect::<Vec<_>>(),
            vec!["dir1/data1", "dir1/data2"]
        );
        assert!(first.is_truncated);
        assert_eq!(first.next_continuation_token.as_deref(), Some("dir1/data2"));

        let second = storage
            .list_objects_page("bucket1", Some("dir1/"), first.next_continuation_token, 1000)
            .await
            .unwrap();
        assert_eq!(second.objects.len(), 1);
        assert_eq!(second.objects[0].key, "dir1/data3");
        assert!(!second.is_truncated);
        assert!(second.next_continuation_token.is_none());

        assert_eq!(storage.list_page_requests(), 2);
    }

    #[tokio::test]
    async fn max_keys_limits_page() {
        let storage = InMemoryStorage::new();
        for key in ["data1", "data2", "data3"] {
            storage.put_object("bucket1", key, 1);
        }

        let page = storage
            .list_objects_page("bucket1", None, None, 2)
            .await
            .unwrap();
        assert_eq!(page.objects.len(), 2);
        assert!(page.is_truncated);
    }

    #[tokio::test]
    async fn list_empty_and_missing_bucket() {
        let storage = InMemoryStorage::new();
        storage.create_bucket("empty-bucket");

        let page = storage
            .list_objects_page("empty-bucket", None, None, 1000)
            .await
            .unwrap();
        assert!(page.objects.is_empty());
        assert!(!page.is_truncated);

        let error = storage
            .list_objects_page("missing-bucket", None, None, 1000)
            .await
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<S3mirrorError>(),
            Some(&S3mirrorError::NoSuchBucket("missing-bucket".to_string()))
        );
    }

    #[tokio::test]
    async fn injected_listing_failure() {
        let storage = InMemoryStorage::new();
        storage.put_object("bucket1", "data1", 1);
        storage.fail_listing("bucket1", S3mirrorError::AccessDenied);

        let error = storage
            .list_objects_page("bucket1", None, None, 1000)
            .await
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<S3mirrorError>(),
            Some(&S3mirrorError::AccessDenied)
        );
    }

    #[tokio::test]
    async fn copy_applies_sse() {
        let storage = InMemoryStorage::new();
        storage.put_object("bucket1", "dir1/data1", 5);
        storage.create_bucket("bucket2");

        storage
            .copy_object(&copy_request("dir1/data1", "dir2/data1"))
            .await
            .unwrap();

        let copied = storage.get_object("bucket2", "dir2/data1").unwrap();
        assert_eq!(copied.size, 5);
        assert_eq!(copied.sse, Some(ServerSideEncryption::AwsKms));
        assert_eq!(copied.sse_kms_key_id.as_deref(), Some("alias/aws/s3"));
        assert_eq!(storage.copy_requests().len(), 1);
    }

    #[tokio::test]
    async fn copy_missing_source() {
        let storage = InMemoryStorage::new();
        storage.create_bucket("bucket1");
        storage.create_bucket("bucket2");

        let error = storage
            .copy_object(&copy_request("dir1/data1", "dir2/data1"))
            .await
            .unwrap_err();
        assert_eq!(
            error.downcast_ref::<S3mirrorError>(),
            Some(&S3mirrorError::ObjectNotFound)
        );
    }

    #[tokio::test]
    async fn copy_fails_given_times() {
        let storage = InMemoryStorage::new();
        storage.put_object("bucket1", "dir1/data1", 5);
        storage.create_bucket("bucket2");
        storage.fail_copy_times("dir1/data1", S3mirrorError::Throttled, 2);

        let request = copy_request("dir1/data1", "dir2/data1");
        assert!(storage.copy_object(&request).await.is_err());
        assert!(storage.copy_object(&request).await.is_err());
        assert!(storage.copy_object(&request).await.is_ok());

        assert_eq!(storage.copy_requests().len(), 3);
        assert!(storage.get_object("bucket2", "dir2/data1").is_some());
    }

    fn copy_request(source_key: &str, target_key: &str) -> CopyObjectRequest {
        CopyObjectRequest {
            source_bucket: "bucket1".to_string(),
            source_key: source_key.to_string(),
            target_bucket: "bucket2".to_string(),
            target_key: target_key.to_string(),
            sse: SseConfig::default(),
        }
    }
}
