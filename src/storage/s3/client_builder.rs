use std::time::Duration;

use aws_config::meta::region::{ProvideRegion, RegionProviderChain};
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, ConfigLoader};
use aws_runtime::env_config::file::{EnvConfigFileKind, EnvConfigFiles};
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Builder;
use aws_smithy_runtime_api::client::stalled_stream_protection::StalledStreamProtectionConfig;
use aws_smithy_types::timeout::TimeoutConfig;
use aws_types::SdkConfig;
use aws_types::region::Region;

use crate::config::ClientConfig;
use crate::types::S3Credentials;

impl ClientConfig {
    pub async fn create_client(&self) -> Client {
        let mut config_builder = Builder::from(&self.load_sdk_config().await)
            .force_path_style(self.force_path_style);

        if let Some(timeout_config) = self.build_timeout_config() {
            config_builder = config_builder.timeout_config(timeout_config);
        }

        Client::from_conf(config_builder.build())
    }

    async fn load_sdk_config(&self) -> SdkConfig {
        let stalled_stream_protection = if self.disable_stalled_stream_protection {
            StalledStreamProtectionConfig::disabled()
        } else {
            StalledStreamProtectionConfig::enabled().build()
        };

        let config_loader = aws_config::defaults(BehaviorVersion::latest())
            .stalled_stream_protection(stalled_stream_protection);
        let mut config_loader = self
            .load_config_credential(config_loader)
            .region(self.build_region_provider())
            .retry_config(self.build_retry_config());

        if let Some(endpoint_url) = &self.endpoint_url {
            config_loader = config_loader.endpoint_url(endpoint_url);
        };

        config_loader.load().await
    }

    fn load_config_credential(&self, mut config_loader: ConfigLoader) -> ConfigLoader {
        match &self.credential {
            S3Credentials::Credentials { access_keys } => {
                let credentials = aws_sdk_s3::config::Credentials::new(
                    access_keys.access_key.to_string(),
                    access_keys.secret_access_key.to_string(),
                    access_keys.session_token.clone(),
                    None,
                    "",
                );
                config_loader = config_loader.credentials_provider(credentials);
            }
            S3Credentials::Profile(profile_name) => {
                let mut builder = aws_config::profile::ProfileFileCredentialsProvider::builder();

                if let Some(aws_shared_credentials_file) = self
                    .client_config_location
                    .aws_shared_credentials_file
                    .as_ref()
                {
                    let profile_files = EnvConfigFiles::builder()
                        .with_file(EnvConfigFileKind::Credentials, aws_shared_credentials_file)
                        .build();
                    builder = builder.profile_files(profile_files)
                }

                config_loader =
                    config_loader.credentials_provider(builder.profile_name(profile_name).build());
            }
            S3Credentials::FromEnvironment => {}
        }
        config_loader
    }

    fn build_region_provider(&self) -> Box<dyn ProvideRegion> {
        let explicit_region = RegionProviderChain::first_try(self.region.clone().map(Region::new));

        let S3Credentials::Profile(profile_name) = &self.credential else {
            return Box::new(explicit_region.or_default_provider());
        };

        let mut builder = aws_config::profile::ProfileFileRegionProvider::builder();
        if let Some(aws_config_file) = self.client_config_location.aws_config_file.as_ref() {
            let profile_files = EnvConfigFiles::builder()
                .with_file(EnvConfigFileKind::Config, aws_config_file)
                .build();
            builder = builder.profile_files(profile_files);
        }

        Box::new(explicit_region.or_else(builder.profile_name(profile_name).build()))
    }

    fn build_retry_config(&self) -> RetryConfig {
        RetryConfig::standard()
            .with_max_attempts(self.retry_config.aws_max_attempts)
            .with_initial_backoff(Duration::from_millis(
                self.retry_config.initial_backoff_milliseconds,
            ))
    }

    fn build_timeout_config(&self) -> Option<TimeoutConfig> {
        let timeouts = &self.cli_timeout_config;

        // Setting every timeout to None would not restore the SDK defaults, so only build when one is set.
        if timeouts.operation_timeout_milliseconds.is_none()
            && timeouts.operation_attempt_timeout_milliseconds.is_none()
            && timeouts.connect_timeout_milliseconds.is_none()
            && timeouts.read_timeout_milliseconds.is_none()
        {
            return None;
        }

        let mut builder = TimeoutConfig::builder();
        if let Some(millis) = timeouts.operation_timeout_milliseconds {
            builder = builder.operation_timeout(Duration::from_millis(millis));
        }
        if let Some(millis) = timeouts.operation_attempt_timeout_milliseconds {
            builder = builder.operation_attempt_timeout(Duration::from_millis(millis));
        }
        if let Some(millis) = timeouts.connect_timeout_milliseconds {
            builder = builder.connect_timeout(Duration::from_millis(millis));
        }
        if let Some(millis) = timeouts.read_timeout_milliseconds {
            builder = builder.read_timeout(Duration::from_millis(millis));
        }

        Some(builder.build())
    }
}
