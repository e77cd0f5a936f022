//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledger-deployer")]
#[command(about = "Deploys a smart-contract application to an Algorand network", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Subcommand to execute
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to configuration file
	#[arg(short, long, value_name = "FILE", default_value = "config/testnet.toml")]
	pub config: PathBuf,

	/// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
	#[arg(long, env = "DEPLOYER_LOG_LEVEL", default_value = "info")]
	pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Deploy the configured application (default)
	Deploy,
	/// Validate the configuration file
	Validate,
}
