use std::str::FromStr;

use aws_sdk_s3::types::ServerSideEncryption;

const INVALID_SSE_VALUE: &str =
    "invalid sse value. valid choices: AES256 | aws:kms | aws:kms:dsse.";

pub fn parse_sse(sse: &str) -> Result<String, String> {
    let parsed = ServerSideEncryption::from_str(sse).map_err(|e| e.to_string())?;

    #[allow(deprecated)]
    if matches!(parsed, ServerSideEncryption::Unknown(_)) {
        return Err(INVALID_SSE_VALUE.to_string());
    }

    Ok(sse.to_string())
}
