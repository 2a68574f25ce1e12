//! metafilter command-line front end
//!
//! Filters a JSON array of search results with a CQL query or a JSON filter
//! tree and prints the matching records.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod config;
mod executor;
mod formatter;

use clap::Parser;
use config::Args;
use executor::Executor;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.verbose).and_then(|()| run(args)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("metafilter={}", level).parse()?),
        )
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let executor = Executor::new(args.into_config());
    tracing::debug!(config = ?executor.config(), "starting");

    let output = executor.execute()?;
    println!("{}", output);
    Ok(())
}
