#[cfg(test)]
mod tests {
    use crate::config::args::*;

    #[test]
    fn with_default_value() {
        init_dummy_tracing_subscriber();

        let args = vec!["s3mirror", "s3://source-bucket/p/", "s3://target-bucket/q/"];

        let config = build_config_from_args(args).unwrap();

        assert!(!config.dry_run);
    }

    #[test]
    fn with_custom_value() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--dry-run",
            "s3://source-bucket/p/",
            "s3://target-bucket/q/",
        ];

        let config = build_config_from_args(args).unwrap();

        assert!(config.dry_run);
        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Info
        );
        assert!(!config.tracing_config.unwrap().json_tracing);
    }

    #[test]
    fn with_quiet() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--dry-run",
            "-qq",
            "s3://source-bucket/p/",
            "s3://target-bucket/q/",
        ];

        let config = build_config_from_args(args).unwrap();

        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Info
        );
    }

    #[test]
    fn with_custom_value_with_tracing_option() {
        init_dummy_tracing_subscriber();

        let args = vec![
            "s3mirror",
            "--dry-run",
            "-vvv",
            "--json-tracing",
            "s3://source-bucket/p/",
            "s3://target-bucket/q/",
        ];

        let config = build_config_from_args(args).unwrap();

        assert!(config.dry_run);
        assert_eq!(
            config.tracing_config.unwrap().tracing_level,
            log::Level::Trace
        );
        assert!(config.tracing_config.unwrap().json_tracing);
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
