//! CLI entrypoint for `propbind-inspect`.

use std::io::{self, Write};

use clap::Parser;
use propbind::EnvironmentSource;
use propbind_inspect::cli::Args;
use propbind_inspect::{InspectError, build_sources, run};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), InspectError> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let sources = build_sources(&args, EnvironmentSource::from_process())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&args, &sources, &mut out)?;
    out.flush()?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
