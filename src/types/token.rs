pub type SyncCancellationToken = tokio_util::sync::CancellationToken;

pub fn create_sync_cancellation_token() -> SyncCancellationToken {
    SyncCancellationToken::new()
}
