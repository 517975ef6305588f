use clap::Parser;
use greener_reporter::app::{self, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = app::setup_logging_safe(cli.config.log_level) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    match app::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
