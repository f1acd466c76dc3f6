use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives are read from `PREP_LOG`, then `RUST_LOG`.
fn log_directives() -> String {
    std::env::var("PREP_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

/// Install the global subscriber. Logs go to stderr so the quiz on stdout stays readable.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_new(log_directives()).unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
