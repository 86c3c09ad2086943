use tracing_subscriber::EnvFilter;

fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing on stderr. `RUST_LOG` wins over `-v` flags.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("payfill={}", level_for(verbose))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();
}
