use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

use aws_sdk_s3::types::ServerSideEncryption;
use clap::Parser;
use clap::builder::{ArgPredicate, NonEmptyStringValueParser};
use clap_verbosity_flag::{Verbosity, WarnLevel};
#[cfg(feature = "version")]
use shadow_rs::shadow;

use crate::Config;
use crate::config::args::value_parser::{sse, storage_path, url};
use crate::config::{CLITimeoutConfig, ClientConfig, ForceRetryConfig, RetryConfig, TracingConfig};
use crate::types::{
    AccessKeys, ClientConfigLocation, DEFAULT_SSE, DEFAULT_SSE_KMS_KEY_ID, S3Credentials,
    SseConfig, SseKmsKeyId,
};

mod tests;
mod value_parser;

const DEFAULT_WORKER_SIZE: u16 = 16;
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_FORCE_RETRY_COUNT: u32 = 5;
const DEFAULT_FORCE_RETRY_INTERVAL_MILLISECONDS: u64 = 1000;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_MAX_KEYS: i32 = 1000;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;

const SAME_SOURCE_AND_TARGET: &str = "SOURCE and TARGET must be different locations\n";
const SSE_KMS_KEY_ID_ARGUMENTS_CONFLICT: &str =
    "--sse-kms-key-id must be used with --sse aws:kms | aws:kms:dsse\n";

#[cfg(feature = "version")]
shadow!(build);

#[derive(Parser, Clone, Debug)]
#[cfg_attr(feature = "version", command(version=format!("{} ({} {}), {}", build::PKG_VERSION, build::SHORT_COMMIT, build::BUILD_TARGET, build::RUST_VERSION)))]
pub struct CLIArgs {
    #[arg(env, help = "s3://<BUCKET_NAME>[/prefix]", value_parser = storage_path::check_storage_path, default_value_if("auto_complete_shell", ArgPredicate::IsPresent, "s3://ignored"), required = false)]
    source: String,

    #[arg(env, help = "s3://<BUCKET_NAME>[/prefix]", value_parser = storage_path::check_storage_path, default_value_if("auto_complete_shell", ArgPredicate::IsPresent, "s3://ignored-target"), required = false)]
    target: String,

    /// A simulation mode. No copy requests will be issued
    #[arg(long, env, default_value_t = DEFAULT_DRY_RUN, help_heading = "General")]
    dry_run: bool,

    /// location of the file that the AWS CLI uses to store configuration profiles
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_config_file: Option<PathBuf>,

    /// location of the file that the AWS CLI uses to store access keys
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_shared_credentials_file: Option<PathBuf>,

    /// source AWS CLI profile
    #[arg(long, env, conflicts_with_all = ["source_access_key", "source_secret_access_key", "source_session_token"], help_heading = "AWS Configuration")]
    source_profile: Option<String>,

    /// source access key
    #[arg(long, env, conflicts_with_all = ["source_profile"], requires = "source_secret_access_key", help_heading = "AWS Configuration")]
    source_access_key: Option<String>,

    /// source secret access key
    #[arg(long, env, conflicts_with_all = ["source_profile"], requires = "source_access_key", help_heading = "AWS Configuration")]
    source_secret_access_key: Option<String>,

    /// source session token
    #[arg(long, env, conflicts_with_all = ["source_profile"], requires = "source_access_key", help_heading = "AWS Configuration")]
    source_session_token: Option<String>,

    /// target AWS CLI profile. Copy requests are issued with the target credentials
    #[arg(long, env, conflicts_with_all = ["target_access_key", "target_secret_access_key", "target_session_token"], help_heading = "AWS Configuration")]
    target_profile: Option<String>,

    /// target access key
    #[arg(long, env, conflicts_with_all = ["target_profile"], requires = "target_secret_access_key", help_heading = "AWS Configuration")]
    target_access_key: Option<String>,

    /// target secret access key
    #[arg(long, env, conflicts_with_all = ["target_profile"], requires = "target_access_key", help_heading = "AWS Configuration")]
    target_secret_access_key: Option<String>,

    /// target session token
    #[arg(long, env, conflicts_with_all = ["target_profile"], requires = "target_access_key", help_heading = "AWS Configuration")]
    target_session_token: Option<String>,

    /// source region
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Source Options")]
    source_region: Option<String>,

    /// source endpoint url
    #[arg(long, env, value_parser = url::check_scheme, help_heading = "Source Options")]
    source_endpoint_url: Option<String>,

    /// force path-style addressing for source endpoint
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "Source Options")]
    source_force_path_style: bool,

    /// target region
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Target Options")]
    target_region: Option<String>,

    /// target endpoint url
    #[arg(long, env, value_parser = url::check_scheme, help_heading = "Target Options")]
    target_endpoint_url: Option<String>,

    /// force path-style addressing for target endpoint
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "Target Options")]
    target_force_path_style: bool,

    /// server-side encryption applied to every copy. valid choices: AES256 | aws:kms | aws:kms:dsse
    #[arg(long, env, default_value = DEFAULT_SSE, value_parser = sse::parse_sse, help_heading = "Encryption")]
    sse: String,

    /// SSE KMS key ID, alias or ARN. Defaults to alias/aws/s3 when --sse is not specified
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "Encryption")]
    sse_kms_key_id: Option<String>,

    /// number of workers issuing copy requests in parallel
    #[arg(long, env, default_value_t = DEFAULT_WORKER_SIZE, value_parser = clap::value_parser!(u16).range(1..), help_heading = "Performance")]
    worker_size: u16,

    /// rate limit copy requests per second
    #[arg(long, env, value_parser = clap::value_parser!(u32).range(10..), help_heading = "Performance")]
    rate_limit_objects: Option<u32>,

    /// trace verbosity(-v: show info, -vv: show debug, -vvv show trace)
    #[clap(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// show trace as json format
    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Tracing/Logging")]
    json_tracing: bool,

    /// enable aws sdk tracing
    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Tracing/Logging")]
    aws_sdk_tracing: bool,

    /// show span event tracing
    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Tracing/Logging")]
    span_events_tracing: bool,

    /// disable ANSI terminal colors
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Tracing/Logging")]
    disable_color_tracing: bool,

    /// maximum retry attempts that the AWS SDK retry handler uses
    #[arg(long, env, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, value_name = "max_attempts", help_heading = "Retry Options")]
    aws_max_attempts: u32,

    /// a multiplier value used when calculating backoff times as part of an exponential backoff with jitter strategy.
    #[arg(long, env, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, value_name = "initial_backoff", help_heading = "Retry Options")]
    initial_backoff_milliseconds: u64,

    /// maximum force retry attempts of a copy after a transient error
    #[arg(long, env, default_value_t = DEFAULT_FORCE_RETRY_COUNT, help_heading = "Retry Options")]
    force_retry_count: u32,

    /// sleep interval (milliseconds) between force retries of a copy
    #[arg(long, env, default_value_t = DEFAULT_FORCE_RETRY_INTERVAL_MILLISECONDS, value_name = "force_retry_interval", help_heading = "Retry Options")]
    force_retry_interval_milliseconds: u64,

    /// operation timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_timeout",
        help_heading = "Timeout Options"
    )]
    operation_timeout_milliseconds: Option<u64>,

    /// operation attempt timeout (milliseconds). For details, see the AWS SDK for Rust TimeoutConfig documentation.
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "operation_attempt_timeout",
        help_heading = "Timeout Options"
    )]
    operation_attempt_timeout_milliseconds: Option<u64>,

    /// connect timeout (milliseconds).
    /// The default has AWS SDK default timeout (Currently 3100 milliseconds).
    #[arg(
        long,
        env,
        value_name = "connect_timeout",
        help_heading = "Timeout Options"
    )]
    connect_timeout_milliseconds: Option<u64>,

    /// read timeout (milliseconds).
    /// The default has no timeout.
    #[arg(
        long,
        env,
        value_name = "read_timeout",
        help_heading = "Timeout Options"
    )]
    read_timeout_milliseconds: Option<u64>,

    /// maximum number of objects returned in a single list object request
    #[arg(long, env, default_value_t = DEFAULT_MAX_KEYS, value_parser = clap::value_parser!(i32).range(1..=32767), help_heading = "Advanced")]
    max_keys: i32,

    /// generate a auto completions script. Valid values: bash, fish, zsh, powershell, elvish.
    #[arg(long, env, value_name = "SHELL", value_parser = clap_complete::shells::Shell::from_str, help_heading = "Advanced")]
    auto_complete_shell: Option<clap_complete::shells::Shell>,

    /// disable stalled stream protection
    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "Advanced")]
    disable_stalled_stream_protection: bool,
}

pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    crate::Config::try_from(config_args)
}

impl CLIArgs {
    fn validate_storage_config(&self) -> Result<(), String> {
        self.check_same_location_conflict()?;
        self.check_sse_conflict()?;

        Ok(())
    }

    fn check_same_location_conflict(&self) -> Result<(), String> {
        if self.auto_complete_shell.is_some() {
            return Ok(());
        }

        let source = storage_path::parse_storage_path(&self.source)?;
        let target = storage_path::parse_storage_path(&self.target)?;

        if source == target {
            return Err(SAME_SOURCE_AND_TARGET.to_string());
        }

        Ok(())
    }

    fn check_sse_conflict(&self) -> Result<(), String> {
        if self.sse_kms_key_id.is_none() {
            return Ok(());
        }

        if !matches!(
            ServerSideEncryption::from_str(&self.sse),
            Ok(ServerSideEncryption::AwsKms | ServerSideEncryption::AwsKmsDsse)
        ) {
            return Err(SSE_KMS_KEY_ID_ARGUMENTS_CONFLICT.to_string());
        }

        Ok(())
    }

    fn build_sse_config(&self) -> SseConfig {
        let sse = ServerSideEncryption::from(self.sse.as_str());

        // Without an explicit key, the default policy uses the AWS managed key of S3.
        let sse_kms_key_id = if self.sse_kms_key_id.is_some() {
            self.sse_kms_key_id.clone()
        } else if sse == ServerSideEncryption::AwsKms {
            Some(DEFAULT_SSE_KMS_KEY_ID.to_string())
        } else {
            None
        };

        SseConfig {
            sse,
            sse_kms_key_id: SseKmsKeyId { id: sse_kms_key_id },
        }
    }

    fn build_credential(
        profile: &Option<String>,
        access_key: &Option<String>,
        secret_access_key: &Option<String>,
        session_token: &Option<String>,
    ) -> S3Credentials {
        if let Some(profile) = profile {
            return S3Credentials::Profile(profile.to_string());
        }

        match (access_key, secret_access_key) {
            (Some(access_key), Some(secret_access_key)) => S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key: access_key.to_string(),
                    secret_access_key: secret_access_key.to_string(),
                    session_token: session_token.clone(),
                },
            },
            _ => S3Credentials::FromEnvironment,
        }
    }

    fn build_client_config(
        &self,
        credential: S3Credentials,
        region: Option<String>,
        endpoint_url: Option<String>,
        force_path_style: bool,
    ) -> ClientConfig {
        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region,
            endpoint_url,
            force_path_style,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
        }
    }

    fn build_client_configs(&self) -> (ClientConfig, ClientConfig) {
        let source_credential = Self::build_credential(
            &self.source_profile,
            &self.source_access_key,
            &self.source_secret_access_key,
            &self.source_session_token,
        );
        let target_credential = Self::build_credential(
            &self.target_profile,
            &self.target_access_key,
            &self.target_secret_access_key,
            &self.target_session_token,
        );

        (
            self.build_client_config(
                source_credential,
                self.source_region.clone(),
                self.source_endpoint_url.clone(),
                self.source_force_path_style,
            ),
            self.build_client_config(
                target_credential,
                self.target_region.clone(),
                self.target_endpoint_url.clone(),
                self.target_force_path_style,
            ),
        )
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let tracing_level = match self.verbosity.log_level() {
            // dry-run results are reported at info level.
            Some(log_level) if self.dry_run && log_level < log::Level::Info => {
                Some(log::Level::Info)
            }
            None if self.dry_run => Some(log::Level::Info),
            log_level => log_level,
        };

        tracing_level.map(|tracing_level| TracingConfig {
            tracing_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        })
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(value: CLIArgs) -> Result<Self, Self::Error> {
        value.validate_storage_config()?;

        let (source_client_config, target_client_config) = value.build_client_configs();

        Ok(Config {
            source: storage_path::parse_storage_path(&value.source)?,
            target: storage_path::parse_storage_path(&value.target)?,
            source_client_config: Some(source_client_config),
            target_client_config: Some(target_client_config),
            force_retry_config: ForceRetryConfig {
                force_retry_count: value.force_retry_count,
                force_retry_interval_milliseconds: value.force_retry_interval_milliseconds,
            },
            tracing_config: value.build_tracing_config(),
            worker_size: value.worker_size,
            max_keys: value.max_keys,
            sse: value.build_sse_config(),
            dry_run: value.dry_run,
            rate_limit_objects: value.rate_limit_objects,
            auto_complete_shell: value.auto_complete_shell,
        })
    }
}
