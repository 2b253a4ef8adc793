//! webcap command line entry point
//!
//! Captures a web page as PNG, JPG, or PDF, or prompts for captures
//! interactively when started without arguments.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let args = webcap::cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(args.log_filter())
        .with_target(false)
        .init();

    tracing::debug!("{} {} starting", webcap::NAME, webcap::VERSION);

    webcap::cli::run(args).await
}
