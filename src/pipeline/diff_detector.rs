use tracing::{debug, trace, warn};

use crate::pipeline::key_translator::KeyTranslator;
use crate::types::{CopyTask, FailedKey, ObjectKeySet, is_directory_marker};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    /// Sorted by source key.
    pub tasks: Vec<CopyTask>,
    pub failed: Vec<FailedKey>,
    pub directory_markers: usize,
    pub already_present: usize,
    pub skipped_in_target_location: usize,
}

/// Decides which source keys are missing at the target. Presence of the translated key is the
/// only criterion; size, ETag and modification time are ignored.
pub struct DiffDetector {
    translator: KeyTranslator,
    target_prefix_in_source: Option<String>,
}

impl DiffDetector {
    pub fn new(translator: KeyTranslator) -> Self {
        Self {
            translator,
            target_prefix_in_source: None,
        }
    }

    /// Source keys starting with `target_prefix` are copies made by an earlier run and are skipped.
    /// Set when the target location is nested inside the source location.
    pub fn with_target_prefix_in_source(mut self, target_prefix: Option<String>) -> Self {
        self.target_prefix_in_source = target_prefix;
        self
    }

    pub fn detect(&self, source_keys: &ObjectKeySet, target_keys: &ObjectKeySet) -> DiffResult {
        let mut result = DiffResult::default();

        for source_key in source_keys {
            if is_directory_marker(source_key) {
                trace!(key = source_key, "directory marker skipped.");
                result.directory_markers += 1;
                continue;
            }

            if self
                .target_prefix_in_source
                .as_ref()
                .is_some_and(|target_prefix| source_key.starts_with(target_prefix.as_str()))
            {
                trace!(key = source_key, "key in the target location skipped.");
                result.skipped_in_target_location += 1;
                continue;
            }

            let target_key = match self.translator.translate(source_key) {
                Ok(target_key) => target_key,
                Err(e) => {
                    warn!(key = source_key, error = e.to_string(), "key translation failed.");
                    result.failed.push(FailedKey {
                        key: source_key.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if target_keys.contains(&target_key) {
                result.already_present += 1;
                continue;
            }

            result.tasks.push(CopyTask {
                source_key: source_key.to_string(),
                target_key,
            });
        }

        result.tasks.sort();
        result.failed.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            source_key_count = source_keys.len(),
            target_key_count = target_keys.len(),
            copy_task_count = result.tasks.len(),
            already_present = result.already_present,
            directory_markers = result.directory_markers,
            skipped_in_target_location = result.skipped_in_target_location,
            "diff detection has been completed."
        );

        result
    }
}
