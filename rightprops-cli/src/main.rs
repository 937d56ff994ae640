// rightprops-cli/src/main.rs
//
// Entry point of the rightprops binary: parses arguments, configures
// logging, runs the collection and maps failures to the exit code.

use clap::Parser;
use rightprops_cli::logging::init_logging;
use rightprops_cli::{Cli, run_collect};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.into());

    match run_collect(&cli).await {
        Ok(path) => log::debug!("Results at '{}'", path.display()),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
