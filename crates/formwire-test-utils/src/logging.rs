/// Install an `env_logger` for test output; repeated calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .is_test(true)
        .try_init();
}
