use clap::Parser;
use contracts_window::cli::commands::Cli;
use contracts_window::cli::handlers;
use contracts_window::io::config_io;
use contracts_window::logging;

fn main() {
    let cli = Cli::parse();

    // Logging is configured before anything else reads the directory, so a
    // bad window.toml falls back to the default filter here and is reported
    // properly by dispatch.
    let filter = handlers::resolve_dir(cli.dir.as_deref())
        .ok()
        .and_then(|dir| config_io::read_config(&dir).ok())
        .map(|config| config.logging.filter)
        .unwrap_or_else(|| "warn".to_string());
    logging::init_tracing(&filter, cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
