#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--force-retry-count",
            "0",
            "--force-retry-interval-milliseconds",
            "10",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.force_retry_config.force_retry_count, 0);
        assert_eq!(
            config.force_retry_config.force_retry_interval_milliseconds,
            10
        );
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
