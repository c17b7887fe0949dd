//! # CLI Module
//!
//! Command-line entry points for the `dishpatch` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the demo API:
//!
//! ```bash
//! dishpatch serve --config dishpatch.yaml --addr 127.0.0.1:8080
//! ```
//!
//! Options:
//! - `--config <FILE>` - YAML config file (all fields optional)
//! - `--addr <ADDR>` - bind address; wins over the config file and `DISHPATCH_ADDR`
//!
//! The server stops on `SIGINT` or `SIGTERM`.
//!
//! ### `routes`
//!
//! Print the demo routing table in match order:
//!
//! ```bash
//! dishpatch routes
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use dishpatch::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_dispatcher, run_cli, Cli, Commands};
