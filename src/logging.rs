use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// Logs are plain lines on stdout without timestamps. The level comes from
/// the command line only: `quiet` shows warnings and errors, otherwise each
/// `-v` steps from `info` to `debug` to `trace`.
pub fn init(verbosity: u8, quiet: bool) {
    let level = if quiet {
        "warn"
    } else {
        match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME")));

    // A subscriber may already be installed when embedded in another program.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}
