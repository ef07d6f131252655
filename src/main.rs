//! Binary entrypoint for the `linkhub` CLI.

use std::process::ExitCode;

use linkhub::config::Config;

fn main() -> ExitCode {
    // Recording is handled in commands::dispatch via LINKHUB_RECORD=<dir>.
    let config = Config::from_env();
    linkhub::logging::init(&config.log_filter);
    match linkhub::run(std::env::args(), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
