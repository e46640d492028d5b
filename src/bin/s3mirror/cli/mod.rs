use anyhow::{Result, anyhow};
use tokio::time::Instant;
use tracing::{error, trace, warn};

use s3mirror::Config;
use s3mirror::pipeline::Pipeline;
use s3mirror::types::token::create_sync_cancellation_token;
use s3mirror::types::{SyncResult, SyncStatus};

mod ctrl_c_handler;

#[allow(dead_code)]
const EXIT_CODE_SUCCESS: i32 = 0;
#[allow(dead_code)]
const EXIT_CODE_ERROR: i32 = 1;
#[allow(dead_code)]
const EXIT_CODE_INVALID_ARGS: i32 = 2;
const EXIT_CODE_WARNING: i32 = 3;

pub async fn run(config: Config) -> Result<()> {
    let status = {
        let cancellation_token = create_sync_cancellation_token();

        ctrl_c_handler::spawn_ctrl_c_handler(cancellation_token.clone());

        let start_time = Instant::now();
        trace!("mirror pipeline start.");

        let pipeline = Pipeline::from_config(config, cancellation_token).await?;
        let result = pipeline.run().await;

        let duration_sec = format!("{:.3}", start_time.elapsed().as_secs_f32());
        let sync_result = match result {
            Ok(sync_result) => sync_result,
            Err(e) => {
                error!(duration_sec = duration_sec, error = format!("{e:#}"), "s3mirror failed.");
                return Err(e);
            }
        };

        println!("{}", build_summary_json(&sync_result)?);

        trace!(duration_sec = duration_sec, "s3mirror has been completed.");
        sync_result.status()
    };

    match status {
        SyncStatus::Succeeded => Ok(()),
        SyncStatus::PartiallySucceeded => {
            warn!("some objects could not be copied.");
            std::process::exit(EXIT_CODE_WARNING);
        }
        SyncStatus::Failed => Err(anyhow!("s3mirror failed. no object has been copied.")),
    }
}

fn build_summary_json(sync_result: &SyncResult) -> Result<String> {
    Ok(serde_json::to_string(&sync_result.summary())?)
}
