use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use leaky_bucket::RateLimiter;
use tracing::debug;

use crate::Config;
use crate::config::ClientConfig;
use crate::storage::s3::S3Storage;
use crate::storage::{Storage, StoragePair};

// default refill interval 100ms
const REFILL_PER_INTERVAL_DIVIDER: usize = 10;

pub async fn create_storage_pair(config: &Config) -> Result<StoragePair> {
    let source = create_storage(config.source_client_config.as_ref(), "source").await?;
    let target = create_storage(config.target_client_config.as_ref(), "target").await?;

    Ok(StoragePair { source, target })
}

async fn create_storage(client_config: Option<&ClientConfig>, side: &str) -> Result<Storage> {
    let client_config =
        client_config.ok_or_else(|| anyhow!("{side} client configuration is not specified."))?;

    debug!(
        side = side,
        region = client_config.region,
        endpoint_url = client_config.endpoint_url,
        "creating S3 client."
    );

    Ok(S3Storage::boxed_new(client_config).await)
}

/// Copy requests per second. The bucket starts full.
///
/// Rates below 10 per second are refilled once a second, since the 100ms interval cannot carry less than one token.
pub fn create_rate_limiter(rate_limit_objects: Option<u32>) -> Option<Arc<RateLimiter>> {
    let rate_limit_value = rate_limit_objects?.max(1) as usize;
    let mut builder = RateLimiter::builder();
    builder
        .max(rate_limit_value)
        .initial(rate_limit_value)
        .fair(true);

    let builder = if rate_limit_value < REFILL_PER_INTERVAL_DIVIDER {
        builder
            .interval(Duration::from_secs(1))
            .refill(rate_limit_value)
    } else {
        builder.refill(rate_limit_value / REFILL_PER_INTERVAL_DIVIDER)
    };

    Some(Arc::new(builder.build()))
}
