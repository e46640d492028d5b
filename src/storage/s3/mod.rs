use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::Object;
use aws_smithy_types_convert::date_time::DateTimeExt;
use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::storage::{CopyObjectRequest, ListObjectsPage, Storage, StorageTrait};
use crate::types::ObjectRecord;

mod client_builder;

#[derive(Clone)]
pub struct S3Storage {
    client: Arc<Client>,
}

impl S3Storage {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    pub async fn boxed_new(client_config: &ClientConfig) -> Storage {
        Arc::new(S3Storage::new(Arc::new(client_config.create_client().await)))
    }

    pub fn get_client(&self) -> Arc<Client> {
        self.client.clone()
    }
}

#[async_trait]
impl StorageTrait for S3Storage {
    async fn list_objects_page(
        &self,
        bucket: &str,
        prefix: Option<&str>,
        continuation_token: Option<String>,
        max_keys: i32,
    ) -> Result<ListObjectsPage> {
        let list_objects_output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(prefix.map(|prefix| prefix.to_string()))
            .set_continuation_token(continuation_token)
            .max_keys(max_keys)
            .send()
            .await
            .context("aws_sdk_s3::client::list_objects_v2() failed.")?;

        let objects = list_objects_output
            .contents()
            .iter()
            .filter_map(convert_to_object_record)
            .collect::<Vec<_>>();

        trace!(
            bucket = bucket,
            key_count = objects.len(),
            "list_objects_v2() page received."
        );

        Ok(ListObjectsPage {
            objects,
            next_continuation_token: list_objects_output
                .next_continuation_token()
                .map(|token| token.to_string()),
            is_truncated: list_objects_output.is_truncated().unwrap_or(false),
        })
    }

    async fn copy_object(&self, request: &CopyObjectRequest) -> Result<()> {
        let sse_kms_key_id = if request.sse.is_kms() {
            request.sse.sse_kms_key_id.id.clone()
        } else {
            None
        };

        let copy_object_output = self
            .client
            .copy_object()
            .copy_source(build_copy_source(&request.source_bucket, &request.source_key))
            .bucket(&request.target_bucket)
            .key(&request.target_key)
            .server_side_encryption(request.sse.sse.clone())
            .set_ssekms_key_id(sse_kms_key_id)
            .send()
            .await
            .context("aws_sdk_s3::client::copy_object() failed.")?;

        debug!(
            source_key = request.source_key,
            target_key = request.target_key,
            e_tag = copy_object_output
                .copy_object_result()
                .and_then(|result| result.e_tag()),
            "copy_object() completed."
        );

        Ok(())
    }
}

/// `CopySource` is `bucket/key` with the key URL-encoded.
pub fn build_copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, urlencoding::encode(key))
}

fn convert_to_object_record(object: &Object) -> Option<ObjectRecord> {
    let key = object.key()?;

    Some(ObjectRecord {
        key: key.to_string(),
        size: object.size().unwrap_or_default(),
        last_modified: object
            .last_modified()
            .and_then(|last_modified| last_modified.to_chrono_utc().ok()),
        e_tag: object.e_tag().map(|e_tag| e_tag.to_string()),
    })
}
