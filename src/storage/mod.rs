use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{ObjectRecord, SseConfig};

pub mod memory;
pub mod s3;

pub type Storage = Arc<dyn StorageTrait + Send + Sync>;

pub struct StoragePair {
    pub source: Storage,
    pub target: Storage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListObjectsPage {
    pub objects: Vec<ObjectRecord>,
    pub next_continuation_token: Option<String>,
    pub is_truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyObjectRequest {
    pub source_bucket: String,
    pub source_key: String,
    pub target_bucket: String,
    pub target_key: String,
    pub sse: SseConfig,
}

/// The object store operations needed for mirroring.
///
/// Credentials, regions and endpoints are the concern of the implementation.
#[async_trait]
pub trait StorageTrait {
    /// Returns one page of a listing. `prefix` of `None` lists the whole bucket.
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
        max_keys: i32,
    ) -> Result<ListObjectsPage>;

    /// Server-side copy. The store applies `request.sse` to the new object.
    async fn copy_object(&self, request: &CopyObjectRequest) -> Result<()>;
}
