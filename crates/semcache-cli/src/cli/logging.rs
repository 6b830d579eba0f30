use tracing_subscriber::{fmt, EnvFilter};

/// Level comes from `SEMCACHE_LOG` (an `EnvFilter` directive). Defaults to
/// `warn` so answers on stdout are not buried in diagnostics.
pub fn init_logging(json: bool) {
    let directive = std::env::var("SEMCACHE_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_target(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
