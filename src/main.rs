mod cli;
mod error;
mod logging;

use crate::cli::Cli;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Usage errors exit with status 2 here, before anything else happens.
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.run() {
        Ok(summary) => {
            tracing::info!(
                copied = summary.copied,
                disambiguated = summary.disambiguated,
                skipped = summary.skipped,
                failed = summary.failed,
                "Done"
            );
            ExitCode::SUCCESS
        },
        Err(err) => {
            // The debug form renders the whole error tree.
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}
