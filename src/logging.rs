use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr subscriber. `RUST_LOG` overrides `filter` when set;
/// `verbose` forces debug output for this crate.
pub fn init_tracing(filter: &str, verbose: bool) {
    let directive = if verbose {
        "contracts_window=debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| filter.to_string())
    };
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("warning: bad log filter '{}': {}; using 'warn'", directive, e);
        EnvFilter::new("warn")
    });

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(env_filter)
        .try_init();
}
