/*!
# Overview
s3mirror is a one-way mirror for S3.
It copies every object under a source bucket/prefix that is missing under a target bucket/prefix.

## Behavior
- Presence only: an object is copied when its translated key does not exist in the target.
  Size, ETag and modification time are not compared, and existing target objects are never overwritten.
- Never deletes: objects that exist only in the target are left untouched.
- Server-side copy: objects are copied with `CopyObject`, so no data passes through the client.
  Every copy carries a server-side encryption policy (`aws:kms` with `alias/aws/s3` by default).
- Prefix translation: the leading source prefix of a key is replaced with the target prefix.
  `s3://bucket/a/b/sub/a/b/x` mirrored to `s3://bucket/a/c` becomes `a/c/sub/a/b/x`.
- Directory markers (keys ending with `/`) are never copied.
- Partial failure: a failed key does not stop the other keys. A listing failure aborts the run before any copy.

## As a library
s3mirror CLI is a thin wrapper of the s3mirror library. All the CLI arguments can be passed to the library.

Example usage
=============

```Toml
[dependencies]
s3mirror = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3mirror::config::Config;
use s3mirror::config::args::parse_from_args;
use s3mirror::pipeline::Pipeline;
use s3mirror::types::SyncStatus;
use s3mirror::types::token::create_sync_cancellation_token;

#[tokio::main]
async fn main() {
    // You can use all the arguments for s3mirror CLI.
    let args = vec![
        "program_name",
        "--aws-max-attempts",
        "7",
        "s3://source-bucket/p/",
        "s3://target-bucket/q/",
    ];

    // s3mirror library converts the arguments to Config.
    let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();

    // You can use this token to cancel the mirror.
    let cancellation_token = create_sync_cancellation_token();
    let pipeline = Pipeline::from_config(config, cancellation_token)
        .await
        .unwrap();

    // A listing failure is returned as an error. Per key failures are in the result.
    let result = pipeline.run().await.unwrap();
    if result.status() != SyncStatus::Succeeded {
        println!("failed keys: {:?}", result.failed_keys());
    }

    println!("{}", serde_json::to_string(&result.summary()).unwrap());
}
```

Any store that implements [`storage::StorageTrait`] can be mirrored with [`pipeline::Pipeline::new`].
[`storage::memory::InMemoryStorage`] is an in-memory store with fault injection.
*/

pub use config::Config;
pub use config::args::CLIArgs;

pub mod config;
pub mod pipeline;
pub mod storage;
pub mod types;
