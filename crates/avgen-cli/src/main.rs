use avgen_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Log file first; stderr if the state dir is unusable.
    if let Err(err) = logging::init_logging() {
        match logging::init_logging_stderr() {
            Ok(()) => tracing::warn!("file logging unavailable, using stderr: {:#}", err),
            Err(fallback) => eprintln!("avgen: logging unavailable: {:#}; {:#}", err, fallback),
        }
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("avgen error: {:#}", err);
        std::process::exit(1);
    }
}
