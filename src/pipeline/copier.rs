use anyhow::{Error, Result};
use async_channel::{Receiver, Sender};
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::copy_object::CopyObjectError;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;
use aws_smithy_types::body::SdkBody;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::storage::CopyObjectRequest;
use crate::types::error::S3mirrorError;
use crate::types::{CopiedKey, CopyTask, FailedKey};

use super::stage::{SendResult, Stage};

const THROTTLING_ERROR_CODES: &[&str] = &[
    "SlowDown",
    "Throttling",
    "ThrottlingException",
    "RequestLimitExceeded",
    "RequestTimeout",
    "InternalError",
    "ServiceUnavailable",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CopyReport {
    pub copied: Vec<CopiedKey>,
    pub failed: Vec<FailedKey>,
    pub not_attempted: usize,
}

#[derive(Debug, Clone, PartialEq)]
enum CopyOutcome {
    Copied(CopiedKey),
    Failed(FailedKey),
    NotAttempted,
}

pub struct ObjectCopier {
    base: Stage,
}

impl ObjectCopier {
    pub fn new(base: Stage) -> Self {
        Self { base }
    }

    /// Copies every task with a pool of `worker_size` workers.
    ///
    /// A failed key never stops the other keys. After cancellation, tasks that no worker picked up
    /// are counted as not attempted.
    pub async fn copy_all(&self, tasks: Vec<CopyTask>) -> CopyReport {
        let task_count = tasks.len();
        if task_count == 0 {
            return CopyReport::default();
        }

        let (task_sender, task_receiver) = async_channel::bounded(task_count);
        let (outcome_sender, outcome_receiver) = async_channel::bounded(task_count);

        for task in tasks {
            // The channel can hold every task and nobody has closed it yet.
            if let Err(e) = task_sender.send(task).await {
                error!(error = e.to_string(), "failed to queue copy task.");
            }
        }
        task_sender.close();

        let worker_size = self.base.config.worker_size.max(1);
        let mut workers: Vec<JoinHandle<()>> = Vec::with_capacity(worker_size as usize);
        for worker_index in 0..worker_size {
            let worker = CopyWorker::new(
                self.base.clone(),
                worker_index,
                task_receiver.clone(),
                outcome_sender.clone(),
            );
            workers.push(tokio::spawn(async move { worker.copy().await }));
        }
        drop(outcome_sender);

        for worker in workers {
            if let Err(e) = worker.await {
                error!(error = e.to_string(), "copy worker has panicked.");
            }
        }

        let mut report = CopyReport::default();
        while let Ok(outcome) = outcome_receiver.try_recv() {
            match outcome {
                CopyOutcome::Copied(copied) => report.copied.push(copied),
                CopyOutcome::Failed(failed) => report.failed.push(failed),
                CopyOutcome::NotAttempted => {}
            }
        }
        report.not_attempted = task_count - report.copied.len() - report.failed.len();

        report.copied.sort_by(|a, b| a.source_key.cmp(&b.source_key));
        report.failed.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            copied = report.copied.len(),
            failed = report.failed.len(),
            not_attempted = report.not_attempted,
            "copy has been completed."
        );

        report
    }
}

struct CopyWorker {
    worker_index: u16,
    base: Stage,
    receiver: Receiver<CopyTask>,
    sender: Sender<CopyOutcome>,
}

impl CopyWorker {
    fn new(
        base: Stage,
        worker_index: u16,
        receiver: Receiver<CopyTask>,
        sender: Sender<CopyOutcome>,
    ) -> Self {
        Self {
            worker_index,
            base,
            receiver,
            sender,
        }
    }

    async fn copy(&self) {
        trace!(worker_index = self.worker_index, "copy worker has started.");

        loop {
            tokio::select! {
                biased;
                _ = self.base.cancellation_token.cancelled() => {
                    info!(worker_index = self.worker_index, "copy worker has been cancelled.");
                    return;
                }
                recv_result = self.receiver.recv() => {
                    match recv_result {
                        Ok(task) => {
                            let outcome = self.copy_object_with_force_retry(task).await;
                            match self.base.send(&self.sender, outcome).await {
                                Ok(SendResult::Success) => {}
                                Ok(SendResult::Closed) | Err(_) => {
                                    error!(worker_index = self.worker_index, "outcome channel has been closed.");
                                    return;
                                }
                            }
                        }
                        Err(_) => {
                            // normal shutdown
                            trace!(worker_index = self.worker_index, "copy worker has been completed.");
                            return;
                        }
                    }
                }
            }
        }
    }

    async fn copy_object_with_force_retry(&self, task: CopyTask) -> CopyOutcome {
        if self.base.config.dry_run {
            info!(
                worker_index = self.worker_index,
                source_key = task.source_key,
                target_key = task.target_key,
                "[dry-run] copy object."
            );
            return copied(task);
        }

        let request = CopyObjectRequest {
            source_bucket: self.base.config.source.bucket.to_string(),
            source_key: task.source_key.to_string(),
            target_bucket: self.base.config.target.bucket.to_string(),
            target_key: task.target_key.to_string(),
            sse: self.base.config.sse.clone(),
        };
        let force_retry_config = self.base.config.force_retry_config;

        let mut retry_count = 0;
        let mut last_error: Option<Error> = None;
        loop {
            // no request is issued once cancelled
            if !self.acquire_rate_limit_or_cancelled().await {
                return match last_error {
                    Some(e) => self.copy_failed(task, &e),
                    None => {
                        debug!(
                            worker_index = self.worker_index,
                            key = task.source_key,
                            "copy has been cancelled before it was issued."
                        );
                        CopyOutcome::NotAttempted
                    }
                };
            }

            let e = match self.base.target.copy_object(&request).await {
                Ok(()) => {
                    info!(
                        worker_index = self.worker_index,
                        source_key = task.source_key,
                        target_key = task.target_key,
                        "object copied."
                    );
                    return copied(task);
                }
                Err(e) => e,
            };

            if !is_force_retryable_error(&e)
                || retry_count >= force_retry_config.force_retry_count
                || self.base.is_cancelled()
            {
                return self.copy_failed(task, &e);
            }

            retry_count += 1;
            warn!(
                worker_index = self.worker_index,
                key = task.source_key,
                retry_count = retry_count,
                error = format!("{e:#}"),
                "force retryable error has occurred."
            );

            let interval = std::time::Duration::from_millis(
                force_retry_config.force_retry_interval_milliseconds,
            );
            tokio::select! {
                biased;
                _ = self.base.cancellation_token.cancelled() => {
                    info!(
                        worker_index = self.worker_index,
                        key = task.source_key,
                        "copy has been cancelled while waiting for retry."
                    );
                    return self.copy_failed(task, &e);
                }
                _ = tokio::time::sleep(interval) => {}
            }

            last_error = Some(e);
        }
    }

    fn copy_failed(&self, task: CopyTask, e: &Error) -> CopyOutcome {
        self.log_copy_error(&task, e);

        CopyOutcome::Failed(FailedKey {
            key: task.source_key,
            reason: format!("{e:#}"),
        })
    }

    /// Returns `false` when cancelled before a rate limit token is acquired.
    async fn acquire_rate_limit_or_cancelled(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.base.cancellation_token.cancelled() => false,
            _ = self.base.acquire_rate_limit() => true,
        }
    }

    fn log_copy_error(&self, task: &CopyTask, e: &Error) {
        let error = format!("{e:#}");

        if is_not_found_error(e) {
            warn!(
                worker_index = self.worker_index,
                key = task.source_key,
                error = error,
                "object not found. skipping."
            );
        } else if is_access_denied_error(e) {
            warn!(
                worker_index = self.worker_index,
                key = task.source_key,
                error = error,
                "access denied. skipping."
            );
        } else {
            error!(
                worker_index = self.worker_index,
                key = task.source_key,
                error = error,
                "copy object failed."
            );
        }
    }
}

fn copied(task: CopyTask) -> CopyOutcome {
    CopyOutcome::Copied(CopiedKey {
        source_key: task.source_key,
        target_key: task.target_key,
    })
}

fn is_force_retryable_error(e: &Error) -> bool {
    if let Some(error) = e.downcast_ref::<SdkError<CopyObjectError, Response<SdkBody>>>() {
        return is_force_sdk_retryable_error(error);
    }

    if let Some(error) = e.downcast_ref::<S3mirrorError>() {
        return error.is_transient();
    }

    false
}

fn is_force_sdk_retryable_error(e: &SdkError<CopyObjectError, Response<SdkBody>>) -> bool {
    match e {
        SdkError::ConstructionFailure(_) => false,
        SdkError::ServiceError(service_error) => service_error
            .err()
            .code()
            .is_some_and(|code| THROTTLING_ERROR_CODES.contains(&code)),
        _ => true,
    }
}

fn service_error_code(e: &Error) -> Option<&str> {
    if let Some(SdkError::ServiceError(service_error)) =
        e.downcast_ref::<SdkError<CopyObjectError, Response<SdkBody>>>()
    {
        return service_error.err().code();
    }

    None
}

fn is_not_found_error(e: &Error) -> bool {
    if let Some(err) = e.downcast_ref::<S3mirrorError>() {
        return *err == S3mirrorError::ObjectNotFound;
    }

    service_error_code(e) == Some("NoSuchKey")
}

fn is_access_denied_error(e: &Error) -> bool {
    if let Some(err) = e.downcast_ref::<S3mirrorError>() {
        return *err == S3mirrorError::AccessDenied;
    }

    service_error_code(e) == Some("AccessDenied")
}
