#![allow(dead_code)]

use std::sync::Arc;

#[cfg(feature = "e2e_test")]
use aws_config::meta::region::{ProvideRegion, RegionProviderChain};
#[cfg(feature = "e2e_test")]
use aws_config::{BehaviorVersion, ConfigLoader};
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::client::Client;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::config::Builder;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::primitives::ByteStream;
#[cfg(feature = "e2e_test")]
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
#[cfg(feature = "e2e_test")]
use aws_types::SdkConfig;
#[cfg(feature = "e2e_test")]
use uuid::Uuid;

use s3mirror::Config;
use s3mirror::config::args::parse_from_args;
use s3mirror::pipeline::Pipeline;
use s3mirror::storage::StoragePair;
use s3mirror::storage::memory::InMemoryStorage;
use s3mirror::types::SyncResult;
use s3mirror::types::token::create_sync_cancellation_token;

pub const SOURCE_BUCKET: &str = "source-bucket";
pub const TARGET_BUCKET: &str = "target-bucket";

#[cfg(feature = "e2e_test")]
pub const REGION: &str = "ap-northeast-1";
#[cfg(feature = "e2e_test")]
const PROFILE_NAME: &str = "s3mirror-e2e-test";

pub struct TestHelper {
    #[cfg(feature = "e2e_test")]
    client: Client,
}

impl TestHelper {
    pub fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }

    /// An in-memory store holding both buckets. Keys ending with `/` are stored as directory markers.
    pub fn create_storage(source_keys: &[&str], target_keys: &[&str]) -> InMemoryStorage {
        let storage = InMemoryStorage::new();
        storage.create_bucket(SOURCE_BUCKET);
        storage.create_bucket(TARGET_BUCKET);

        for key in source_keys {
            storage.put_object(SOURCE_BUCKET, key, 1);
        }
        for key in target_keys {
            storage.put_object(TARGET_BUCKET, key, 1);
        }

        storage
    }

    pub fn build_config(args: Vec<&str>) -> Config {
        Config::try_from(parse_from_args(args).unwrap()).unwrap()
    }

    pub fn build_pipeline(storage: &InMemoryStorage, config: Config) -> Pipeline {
        let storage_pair = StoragePair {
            source: Arc::new(storage.clone()),
            target: Arc::new(storage.clone()),
        };

        Pipeline::new(config, storage_pair, create_sync_cancellation_token())
    }

    pub async fn mirror(storage: &InMemoryStorage, source: &str, target: &str) -> SyncResult {
        let config = Self::build_config(vec![
            "s3mirror",
            "--force-retry-interval-milliseconds",
            "1",
            source,
            target,
        ]);

        Self::build_pipeline(storage, config).run().await.unwrap()
    }
}

#[cfg(feature = "e2e_test")]
impl TestHelper {
    pub async fn new() -> Self {
        Self {
            client: Self::create_client().await,
        }
    }

    pub fn generate_bucket_name() -> String {
        format!("s3mirror-e2e-{}", Uuid::new_v4())
    }

    pub async fn create_client() -> Client {
        Client::from_conf(Builder::from(&Self::load_sdk_config().await).build())
    }

    async fn load_sdk_config() -> SdkConfig {
        let config_loader =
            Self::load_config_credential(aws_config::defaults(BehaviorVersion::latest()))
                .region(Self::build_provider_region());

        config_loader.load().await
    }

    fn load_config_credential(config_loader: ConfigLoader) -> ConfigLoader {
        let builder = aws_config::profile::ProfileFileCredentialsProvider::builder();

        config_loader.credentials_provider(builder.profile_name(PROFILE_NAME).build())
    }

    fn build_provider_region() -> Box<dyn ProvideRegion> {
        let builder =
            aws_config::profile::ProfileFileRegionProvider::builder().profile_name(PROFILE_NAME);

        Box::new(RegionProviderChain::first_try(builder.build()))
    }

    pub fn profile_args() -> Vec<&'static str> {
        vec![
            "--source-profile",
            PROFILE_NAME,
            "--target-profile",
            PROFILE_NAME,
        ]
    }

    pub async fn create_bucket(&self, bucket: &str, region: &str) {
        let cfg = CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build();

        self.client
            .create_bucket()
            .create_bucket_configuration(cfg)
            .bucket(bucket)
            .send()
            .await
            .unwrap();
    }

    pub async fn put_empty_object(&self, bucket: &str, key: &str) {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from_static(b"s3mirror"))
            .send()
            .await
            .unwrap();
    }

    pub async fn list_keys(&self, bucket: &str, prefix: &str) -> Vec<String> {
        let list_objects_output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .unwrap();

        list_objects_output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(|key| key.to_string()))
            .collect()
    }

    pub async fn head_object(&self, bucket: &str, key: &str) -> HeadObjectOutput {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete_bucket_with_cascade(&self, bucket: &str) {
        for key in self.list_keys(bucket, "").await {
            self.client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .unwrap();
        }

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .unwrap();
    }
}
