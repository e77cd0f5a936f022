//! Ledger-facing types and the client trait used to talk to a node.

use crate::{
	common::{Address, MicroAlgos, Round, TransactionId},
	errors::Result,
	transaction::SignedTransaction,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Status record for a submitted transaction.
///
/// `confirmed_round` is zero while the transaction is pending and is set once,
/// to the round that included it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PendingTransactionInfo {
	pub confirmed_round: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub application_index: Option<u64>,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub pool_error: String,
}

impl PendingTransactionInfo {
	/// A record describing a transaction that has not been confirmed yet.
	pub fn pending() -> Self {
		Self::default()
	}

	/// A record describing a transaction confirmed in `round`.
	pub fn confirmed(round: u64, application_index: Option<u64>) -> Self {
		Self {
			confirmed_round: round,
			application_index,
			pool_error: String::new(),
		}
	}

	pub fn is_confirmed(&self) -> bool {
		self.confirmed_round > 0
	}
}

/// Balance snapshot of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
	pub address: Address,
	pub amount: MicroAlgos,
}

/// Network parameters needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
	/// Fee per byte of the signed transaction.
	pub fee: u64,
	pub min_fee: u64,
	pub first_valid: Round,
	pub last_valid: Round,
	pub genesis_id: String,
	pub genesis_hash: [u8; 32],
}

/// Result of compiling a program on the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProgram {
	/// Address-form hash of the program, as reported by the node.
	pub hash: String,
	pub bytes: Vec<u8>,
}

/// Client for a ledger node.
///
/// Implementations map every transport or service failure to
/// `DeployError::Network`; callers never retry on errors.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
	/// Latest round known to the node.
	async fn current_round(&self) -> Result<Round>;

	/// Suspends until the node has observed `round`.
	async fn wait_for_round(&self, round: Round) -> Result<()>;

	/// Status of a previously submitted transaction.
	async fn pending_transaction_info(&self, tx_id: &TransactionId)
		-> Result<PendingTransactionInfo>;

	async fn account_info(&self, address: &Address) -> Result<AccountInfo>;

	async fn suggested_params(&self) -> Result<SuggestedParams>;

	/// Compiles program source into bytecode.
	async fn compile(&self, source: &str) -> Result<CompiledProgram>;

	/// Submits a signed transaction and returns the id assigned by the node.
	async fn send_raw_transaction(&self, signed: &SignedTransaction) -> Result<TransactionId>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_pending_info_from_node_json() {
		let info: PendingTransactionInfo = serde_json::from_str(
			r#"{"confirmed-round": 102, "application-index": 55, "pool-error": ""}"#,
		)
		.unwrap();
		assert_eq!(info, PendingTransactionInfo::confirmed(102, Some(55)));
		assert!(info.is_confirmed());
	}

	#[test]
	fn test_pending_info_missing_fields_is_pending() {
		let info: PendingTransactionInfo = serde_json::from_str(r#"{"txn": {}}"#).unwrap();
		assert_eq!(info, PendingTransactionInfo::pending());
		assert!(!info.is_confirmed());
	}
}
