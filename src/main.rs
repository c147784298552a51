use clap::Parser;
use splitclient::cli::{Cli, describe_error};
use splitclient::telemetry::init_telemetry;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_telemetry(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
