use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_channel::Sender;
use leaky_bucket::RateLimiter;

use crate::Config;
use crate::storage::Storage;
use crate::types::token::SyncCancellationToken;

/// Context shared by every stage of one sync.
#[derive(Clone)]
pub struct Stage {
    pub config: Config,
    pub source: Storage,
    pub target: Storage,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub cancellation_token: SyncCancellationToken,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    Success,
    Closed,
}

impl Stage {
    pub fn new(
        config: Config,
        source: Storage,
        target: Storage,
        rate_limiter: Option<Arc<RateLimiter>>,
        cancellation_token: SyncCancellationToken,
    ) -> Self {
        Self {
            config,
            source,
            target,
            rate_limiter,
            cancellation_token,
        }
    }

    pub async fn send<T: Send + Sync + 'static>(
        &self,
        sender: &Sender<T>,
        item: T,
    ) -> Result<SendResult> {
        let result = sender
            .send(item)
            .await
            .context("async_channel::Sender::send() failed.");

        if let Err(e) = result {
            return if !sender.is_closed() {
                Err(anyhow!(e))
            } else {
                Ok(SendResult::Closed)
            };
        }

        Ok(SendResult::Success)
    }

    pub async fn acquire_rate_limit(&self) {
        if let Some(rate_limiter) = self.rate_limiter.as_ref() {
            rate_limiter.acquire(1).await;
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
