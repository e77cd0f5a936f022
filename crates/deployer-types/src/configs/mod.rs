//! # Configuration Types
//!
//! Configuration structures for a single deployment run.
//!
//! Credentials and the node endpoint live here and are handed explicitly to
//! the components that need them; nothing is read from process-wide state
//! after loading.

use crate::{common::MicroAlgos, transaction::StateSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default number of rounds to wait for confirmation.
pub const DEFAULT_MAX_ROUNDS: u64 = 1000;

/// Default minimum balance required before deploying (0.5 ALGO).
pub const DEFAULT_MIN_BALANCE: MicroAlgos = MicroAlgos(500_000);

/// Root configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployerConfig {
	/// Ledger node connection settings
	pub node: NodeConfig,
	/// Deploying account
	pub account: AccountConfig,
	/// What to deploy and where to record the result
	pub deployment: DeploymentConfig,
	/// Bounds on confirmation waiting
	#[serde(default)]
	pub confirmation: ConfirmationConfig,
}

/// Ledger node connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
	/// Base URL of the node API
	pub url: String,
	/// API token sent with every request; empty for public endpoints
	#[serde(default)]
	pub token: String,
	/// Per-request timeout in seconds
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
	/// Additional PEM certificate to trust, on top of the bundled roots
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ca_certificate: Option<PathBuf>,
}

fn default_request_timeout_secs() -> u64 {
	30
}

/// Deploying account credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountConfig {
	/// 25-word account mnemonic
	pub mnemonic: String,
}

impl fmt::Debug for AccountConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AccountConfig")
			.field("mnemonic", &"<redacted>")
			.finish()
	}
}

/// Programs, schemas and output location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
	/// Approval program source file
	pub approval_program: PathBuf,
	/// Clear-state program source file
	pub clear_program: PathBuf,
	/// File receiving the decimal application id
	#[serde(default = "default_output_file")]
	pub output_file: PathBuf,
	/// Balance required before any transaction is built
	#[serde(default = "default_min_balance")]
	pub min_balance: MicroAlgos,
	#[serde(default = "default_global_schema")]
	pub global_schema: StateSchema,
	#[serde(default)]
	pub local_schema: StateSchema,
	/// Block explorer base URL, used to print a link to the new application
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub explorer_url: Option<String>,
}

fn default_output_file() -> PathBuf {
	PathBuf::from("deployed_app_id.txt")
}

fn default_min_balance() -> MicroAlgos {
	DEFAULT_MIN_BALANCE
}

fn default_global_schema() -> StateSchema {
	StateSchema::new(8, 8)
}

/// Bounds on waiting for a transaction to be confirmed.
///
/// Leaving out `max_rounds` while setting `timeout_secs` bounds the wait by
/// time alone. With neither set, the wait is capped at
/// [`DEFAULT_MAX_ROUNDS`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfirmationConfig {
	/// Maximum number of rounds to wait
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_rounds: Option<u64>,
	/// Wall-clock limit in seconds for the whole wait
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout_secs: Option<u64>,
}

impl ConfirmationConfig {
	/// Round limit to enforce; `None` only when a deadline bounds the wait.
	pub fn round_limit(&self) -> Option<u64> {
		match (self.max_rounds, self.timeout_secs) {
			(Some(rounds), _) => Some(rounds),
			(None, Some(_)) => None,
			(None, None) => Some(DEFAULT_MAX_ROUNDS),
		}
	}
}
