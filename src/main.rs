use anyhow::Result;
use clap::Parser;
use jobwatch::cli;
use tracing::error;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        // Config errors surface before logging is initialised.
        if tracing::dispatcher::has_been_set() {
            error!("{:#}", err);
        } else {
            eprintln!("jobwatch: {:#}", err);
        }
        std::process::exit(1);
    }
    Ok(())
}
