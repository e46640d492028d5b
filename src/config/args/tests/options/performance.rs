#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--worker-size",
            "4",
            "--rate-limit-objects",
            "100",
            "s3://source-bucket",
            "s3://target-bucket",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(config.worker_size, 4);
        assert_eq!(config.rate_limit_objects, Some(100));
    }

    #[test]
    fn zero_is_rejected() {
        init_dummy_tracing_subscriber();

        for option in ["--worker-size", "--rate-limit-objects"] {
            let args = vec![
                "s3mirror",
                option,
                "0",
                "s3://source-bucket",
                "s3://target-bucket",
            ];

            assert!(build_config_from_args(args).is_err());
        }
    }

    #[test]
    fn rate_limit_objects_below_ten_is_rejected() {
        init_dummy_tracing_subscriber();

        for value in ["1", "9"] {
            let args = vec![
                "s3mirror",
                "--rate-limit-objects",
                value,
                "s3://source-bucket",
                "s3://target-bucket",
            ];

            assert!(build_config_from_args(args).is_err());
        }

        let args = vec![
            "s3mirror",
            "--rate-limit-objects",
            "10",
            "s3://source-bucket",
            "s3://target-bucket",
        ];
        assert_eq!(
            build_config_from_args(args).unwrap().rate_limit_objects,
            Some(10)
        );
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
