// deployer-delivery/src/lib.rs

use deployer_types::{
	LedgerClient, PendingTransactionInfo, Result, SignedTransaction, TransactionId,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod confirmation;

pub use confirmation::{ConfirmationWaiter, WaitOptions};

/// Submits signed transactions and waits for them to be confirmed.
pub struct DeliveryService {
	client: Arc<dyn LedgerClient>,
	waiter: ConfirmationWaiter,
}

impl DeliveryService {
	pub fn new(client: Arc<dyn LedgerClient>, options: WaitOptions) -> Self {
		let waiter = ConfirmationWaiter::new(client.clone()).with_options(options);
		Self { client, waiter }
	}

	/// Submits a signed transaction and returns the id assigned by the node.
	pub async fn submit(&self, signed: &SignedTransaction) -> Result<TransactionId> {
		info!("Submitting transaction ({} bytes)", signed.bytes.len());

		let tx_id = self.client.send_raw_transaction(signed).await?;

		if tx_id.as_str() != signed.id {
			warn!(
				local = %signed.id,
				node = %tx_id,
				"Node assigned a different transaction id than computed locally"
			);
		}

		info!(tx_id = %tx_id, "Transaction submitted");
		Ok(tx_id)
	}

	/// Waits for `tx_id` to be confirmed, honouring the configured bounds.
	pub async fn wait_for_confirmation(
		&self,
		tx_id: &TransactionId,
		cancel: &CancellationToken,
	) -> Result<PendingTransactionInfo> {
		let options = self.waiter.options();
		info!(
			tx_id = %tx_id,
			max_rounds = ?options.max_rounds,
			deadline = ?options.deadline,
			"Waiting for confirmation"
		);
		self.waiter.wait(tx_id, cancel).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use deployer_types::{DeployError, MockLedgerClient, Round};

	fn signed() -> SignedTransaction {
		SignedTransaction {
			id: "LOCALID".to_string(),
			bytes: vec![1, 2, 3],
		}
	}

	#[tokio::test]
	async fn test_submit_returns_node_id() {
		let mut client = MockLedgerClient::new();
		client
			.expect_send_raw_transaction()
			.withf(|s| s.bytes == vec![1, 2, 3])
			.times(1)
			.returning(|_| Ok(TransactionId::new("LOCALID").unwrap()));

		let service = DeliveryService::new(Arc::new(client), WaitOptions::default());
		let tx_id = service.submit(&signed()).await.unwrap();

		assert_eq!(tx_id.as_str(), "LOCALID");
	}

	#[tokio::test]
	async fn test_submit_error_propagates() {
		let mut client = MockLedgerClient::new();
		client
			.expect_send_raw_transaction()
			.returning(|_| Err(DeployError::Network("rejected".to_string())));

		let service = DeliveryService::new(Arc::new(client), WaitOptions::default());
		let err = service.submit(&signed()).await.unwrap_err();

		assert!(matches!(err, DeployError::Network(msg) if msg == "rejected"));
	}

	#[tokio::test]
	async fn test_wait_for_confirmation_uses_waiter() {
		let mut client = MockLedgerClient::new();
		client.expect_current_round().returning(|| Ok(Round(9)));
		client
			.expect_pending_transaction_info()
			.returning(|_| Ok(PendingTransactionInfo::confirmed(9, Some(3))));

		let service = DeliveryService::new(
			Arc::new(client),
			WaitOptions {
				max_rounds: Some(1),
				deadline: None,
			},
		);
		let info = service
			.wait_for_confirmation(&TransactionId::new("T").unwrap(), &CancellationToken::new())
			.await
			.unwrap();

		assert_eq!(info.application_index, Some(3));
	}
}
