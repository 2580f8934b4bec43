use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `RUST_LOG` wins over `level`.
///
/// Logs go to stderr so that stdout stays free for the sample stream.
pub fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(crate::utils::consts::LOG_LEVEL));

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

/// Level name for a `-v` count on top of the default.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => crate::utils::consts::LOG_LEVEL,
        1 => "debug",
        _ => "trace",
    }
}
