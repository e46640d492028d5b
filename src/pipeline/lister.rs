use anyhow::{Context, Result, anyhow};
use tracing::{debug, trace};

use crate::storage::Storage;
use crate::types::error::S3mirrorError;
use crate::types::{ObjectKeySet, S3Location};

use super::stage::Stage;

pub struct ObjectLister {
    base: Stage,
}

impl ObjectLister {
    pub fn new(base: Stage) -> Self {
        Self { base }
    }

    pub async fn list_source(&self) -> Result<ObjectKeySet> {
        trace!("list source objects has started.");
        let keys = self.list(&self.base.source, &self.base.config.source).await?;
        trace!("list source objects has been completed.");

        Ok(keys)
    }

    pub async fn list_target(&self) -> Result<ObjectKeySet> {
        trace!("list target objects has started.");
        let keys = self.list(&self.base.target, &self.base.config.target).await?;
        trace!("list target objects has been completed.");

        Ok(keys)
    }

    /// Collects every key under `location`, following continuation tokens until the listing ends.
    ///
    /// Any failure, including cancellation, discards the partial result.
    pub async fn list(&self, storage: &Storage, location: &S3Location) -> Result<ObjectKeySet> {
        let mut keys = ObjectKeySet::new();
        let mut continuation_token: Option<String> = None;
        let mut page_count = 0;

        loop {
            let page = tokio::select! {
                biased;
                _ = self.base.cancellation_token.cancelled() => {
                    debug!(location = location.to_string(), "listing has been cancelled.");
                    return Err(anyhow!(S3mirrorError::Cancelled));
                }
                page = storage.list_objects_page(
                    &location.bucket,
                    location.prefix.as_deref(),
                    continuation_token.take(),
                    self.base.config.max_keys,
                ) => page.with_context(|| format!("listing {location} failed."))?,
            };
            page_count += 1;

            keys.extend(page.objects.into_iter().map(|object| object.key));

            if !page.is_truncated {
                break;
            }

            let Some(next_continuation_token) = page.next_continuation_token else {
                return Err(anyhow!(S3mirrorError::InvalidListingPage))
                    .with_context(|| format!("listing {location} failed."));
            };
            continuation_token = Some(next_continuation_token);
        }

        debug!(
            location = location.to_string(),
            page_count = page_count,
            key_count = keys.len(),
            "listing has been completed."
        );

        Ok(keys)
    }
}
