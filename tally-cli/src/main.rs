use std::process::ExitCode;

use clap::Parser;
use tally_cli::app;
use tally_cli::args::Args;
use tally_cli::logging;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("warning: {}", e);
    }

    if let Err(e) = app::run(&args) {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
