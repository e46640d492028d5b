#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_default_value() {
        init_dummy_tracing_subscriber();

        let args = vec!["s3mirror", "s3://source-bucket", "s3://target-bucket"];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.sse.sse, ServerSideEncryption::AwsKms);
        assert_eq!(
            config.sse.sse_kms_key_id.id.as_deref(),
            Some(DEFAULT_SSE_KMS_KEY_ID)
        );
    }

    #[test]
    fn with_custom_key_id() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--sse-kms-key-id",
            "arn:aws:kms:us-east-1:111111111111:key/xyz123",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.sse.sse, ServerSideEncryption::AwsKms);
        assert_eq!(
            config.sse.sse_kms_key_id.id.as_deref(),
            Some("arn:aws:kms:us-east-1:111111111111:key/xyz123")
        );
    }

    #[test]
    fn with_custom_value_dsse() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--sse",
            "aws:kms:dsse",
            "--sse-kms-key-id",
            "xyz123",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.sse.sse, ServerSideEncryption::AwsKmsDsse);
        assert_eq!(config.sse.sse_kms_key_id.id.as_deref(), Some("xyz123"));
    }

    #[test]
    fn with_aes256() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--sse",
            "AES256",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.sse.sse, ServerSideEncryption::Aes256);
        assert!(config.sse.sse_kms_key_id.id.is_none());
        assert!(!config.sse.is_kms());
    }

    #[test]
    fn key_id_with_aes256_is_rejected() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--sse",
            "AES256",
            "--sse-kms-key-id",
            "xyz123",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        assert_eq!(
            build_config_from_args(args).unwrap_err(),
            SSE_KMS_KEY_ID_ARGUMENTS_CONFLICT.to_string()
        );
    }

    #[test]
    fn invalid_sse() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--sse",
            "kms",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        assert!(build_config_from_args(args).is_err());
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
