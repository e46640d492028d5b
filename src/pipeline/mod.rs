//! One mirror run: list source, list target, diff, copy.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::Config;
use crate::pipeline::copier::ObjectCopier;
use crate::pipeline::diff_detector::DiffDetector;
use crate::pipeline::key_translator::KeyTranslator;
use crate::pipeline::lister::ObjectLister;
use crate::pipeline::stage::Stage;
use crate::storage::StoragePair;
use crate::types::SyncResult;
use crate::types::token::SyncCancellationToken;

mod copier;
mod diff_detector;
mod key_translator;
mod lister;
mod stage;
mod storage_factory;

pub struct Pipeline {
    config: Config,
    storage_pair: StoragePair,
    cancellation_token: SyncCancellationToken,
}

impl Pipeline {
    /// Builds a pipeline over explicitly given stores. `target` issues the copy requests.
    pub fn new(
        config: Config,
        storage_pair: StoragePair,
        cancellation_token: SyncCancellationToken,
    ) -> Self {
        Self {
            config,
            storage_pair,
            cancellation_token,
        }
    }

    /// Builds S3 clients for both sides from `config`.
    pub async fn from_config(
        config: Config,
        cancellation_token: SyncCancellationToken,
    ) -> Result<Self> {
        let storage_pair = storage_factory::create_storage_pair(&config)
            .await
            .context("failed to create S3 clients.")?;

        Ok(Self::new(config, storage_pair, cancellation_token))
    }

    /// A listing failure is returned as an error and no copy is issued.
    /// Per key failures are reported in the result.
    pub async fn run(&self) -> Result<SyncResult> {
        info!(
            source = self.config.source.to_string(),
            target = self.config.target.to_string(),
            dry_run = self.config.dry_run,
            "mirror has started."
        );

        let stage = self.build_stage();

        let lister = ObjectLister::new(stage.clone());
        let source_keys = lister
            .list_source()
            .await
            .context("failed to list source objects.")?;
        let target_keys = lister
            .list_target()
            .await
            .context("failed to list target objects.")?;

        let diff_result = self
            .build_diff_detector()
            .detect(&source_keys, &target_keys);

        let copy_report = ObjectCopier::new(stage).copy_all(diff_result.tasks).await;

        let mut failed = diff_result.failed;
        failed.extend(copy_report.failed);

        let sync_result = SyncResult {
            copied: copy_report.copied,
            failed,
            directory_markers: diff_result.directory_markers,
            already_present: diff_result.already_present,
            skipped_in_target_location: diff_result.skipped_in_target_location,
            not_attempted: copy_report.not_attempted,
            dry_run: self.config.dry_run,
        };

        info!(
            status = format!("{:?}", sync_result.status()),
            copied = sync_result.copied_count(),
            failed = sync_result.failed.len(),
            not_attempted = sync_result.not_attempted,
            "mirror has been completed."
        );

        Ok(sync_result)
    }

    fn build_stage(&self) -> Stage {
        Stage::new(
            self.config.clone(),
            self.storage_pair.source.clone(),
            self.storage_pair.target.clone(),
            storage_factory::create_rate_limiter(self.config.rate_limit_objects),
            self.cancellation_token.clone(),
        )
    }

    fn build_diff_detector(&self) -> DiffDetector {
        let translator = KeyTranslator::from_locations(&self.config.source, &self.config.target);

        let target_prefix_in_source = if self.config.is_target_inside_source() {
            debug!(
                target = self.config.target.to_string(),
                "target is inside source. objects in the target are not copied."
            );
            self.config.target.prefix.clone()
        } else {
            None
        };

        DiffDetector::new(translator).with_target_prefix_in_source(target_prefix_in_source)
    }
}
