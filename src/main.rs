//! Command-line front-end for the Swagger generator.
//!
//! Exit codes: 0 on success, 1 on parse or locate errors, 2 when the router
//! entry file cannot be read.

use clap::Parser;
use log::{error, info};
use swagger_from_go::cli;

fn main() {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::from_default_env().filter_level(log_level).init();

    info!("swagger-from-go starting...");

    let args = match cli::validate_args(args) {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = cli::run(args) {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }

    info!("Swagger document generation completed successfully");
}
