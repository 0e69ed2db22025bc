//! `fie` entry point
//!
//! Parses the command line, runs the command and turns errors into a
//! highlighted banner and an exit code:
//! - `404` - a mod, combination or entity was not found
//! - `500` - any other failure

use clap::Parser;
use factorio_export::cli::Cli;
use factorio_export::core::user_friendly_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = cli.execute().await {
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(error_ctx.exit_code());
    }
}
