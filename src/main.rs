//! openapi-from-routes - command-line front end.
//!
//! Reads a route manifest, resolves the body and response types it names from
//! Rust source directories, and writes an OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! openapi-from-routes [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! openapi-from-routes routes.yaml -s ./src -o openapi.yaml
//! ```
//!
//! Generate JSON documentation plus a Swagger UI page:
//! ```bash
//! openapi-from-routes routes.yaml -s ./src -f json -o docs/openapi.json --ui docs/index.html
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-routes routes.yaml -s ./src -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_routes::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("openapi-from-routes starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("OpenAPI document generation completed successfully");

    Ok(())
}
