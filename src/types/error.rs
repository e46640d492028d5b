use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum S3mirrorError {
    #[error("cancelled")]
    Cancelled,
    #[error("key `{key}` does not start with the source prefix `{prefix}`")]
    KeyOutsidePrefix { key: String, prefix: String },
    #[error("key `{key}` translates to an empty target key")]
    EmptyTargetKey { key: String },
    #[error("listing is truncated but no continuation token was returned")]
    InvalidListingPage,
    #[error("bucket `{0}` does not exist")]
    NoSuchBucket(String),
    #[error("object not found")]
    ObjectNotFound,
    #[error("access denied")]
    AccessDenied,
    #[error("request has been throttled")]
    Throttled,
    #[error("object store is unavailable")]
    StoreUnavailable,
}

impl S3mirrorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Throttled | Self::StoreUnavailable)
    }
}
