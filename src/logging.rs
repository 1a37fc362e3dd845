use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global tracing subscriber.
///
/// The level comes from `RUST_LOG` (e.g. `RUST_LOG=rota_allocator=debug`)
/// and defaults to `info`. Records emitted through the `log` crate, such as
/// actix-web's request logger, are forwarded to the same subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
