#![forbid(unsafe_code)]

//! llv: terminal dashboard for AWS Lambda functions and their logs.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    if let Err(e) = cli_app::run(&args) {
        cli_app::print_error(&e);
        std::process::exit(e.exit_code());
    }
}
