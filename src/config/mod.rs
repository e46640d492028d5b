use crate::types::{ClientConfigLocation, S3Credentials, S3Location, SseConfig};

pub mod args;

#[derive(Debug, Clone)]
pub struct Config {
    pub source: S3Location,
    pub target: S3Location,
    pub source_client_config: Option<ClientConfig>,
    pub target_client_config: Option<ClientConfig>,
    pub force_retry_config: ForceRetryConfig,
    pub tracing_config: Option<TracingConfig>,
    pub worker_size: u16,
    pub max_keys: i32,
    pub sse: SseConfig,
    pub dry_run: bool,
    pub rate_limit_objects: Option<u32>,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    /// Source and target share a bucket and the target prefix lies under the source prefix,
    /// so a source listing also returns objects that were mirrored before.
    pub fn is_target_inside_source(&self) -> bool {
        self.source.bucket == self.target.bucket
            && self.source.prefix != self.target.prefix
            && self
                .target
                .prefix_str()
                .starts_with(self.source.prefix_str())
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

#[derive(Debug, Clone)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ForceRetryConfig {
    pub force_retry_count: u32,
    pub force_retry_interval_milliseconds: u64,
}
