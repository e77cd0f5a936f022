//! Waiting for a submitted transaction to be confirmed.
//!
//! The waiter starts from the node's current round and alternates between
//! querying the transaction status and waiting for the next round. Errors
//! from the node are returned as-is; only "not yet confirmed" leads to
//! another round.

use deployer_types::{
	ConfirmationConfig, DeployError, LedgerClient, PendingTransactionInfo, Result, TransactionId,
	DEFAULT_MAX_ROUNDS,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Bounds on a confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
	/// Maximum number of query/wait iterations before giving up.
	pub max_rounds: Option<u64>,
	/// Wall-clock limit for the whole wait.
	pub deadline: Option<Duration>,
}

impl Default for WaitOptions {
	fn default() -> Self {
		Self {
			max_rounds: Some(DEFAULT_MAX_ROUNDS),
			deadline: None,
		}
	}
}

impl From<&ConfirmationConfig> for WaitOptions {
	fn from(config: &ConfirmationConfig) -> Self {
		Self {
			max_rounds: config.round_limit(),
			deadline: config.timeout_secs.map(Duration::from_secs),
		}
	}
}

/// Polls a ledger node until a transaction is confirmed.
#[derive(Clone)]
pub struct ConfirmationWaiter {
	client: Arc<dyn LedgerClient>,
	options: WaitOptions,
}

impl ConfirmationWaiter {
	pub fn new(client: Arc<dyn LedgerClient>) -> Self {
		Self {
			client,
			options: WaitOptions::default(),
		}
	}

	pub fn with_options(mut self, options: WaitOptions) -> Self {
		self.options = options;
		self
	}

	pub fn options(&self) -> WaitOptions {
		self.options
	}

	/// Blocks until `tx_id` is confirmed and returns its status record.
	///
	/// # Errors
	///
	/// - `DeployError::Timeout` when the round bound or deadline is exhausted
	/// - `DeployError::Cancelled` when `cancel` fires
	/// - any error from the ledger client, unchanged
	pub async fn wait(
		&self,
		tx_id: &TransactionId,
		cancel: &CancellationToken,
	) -> Result<PendingTransactionInfo> {
		match self.options.deadline {
			Some(deadline) => tokio::time::timeout(deadline, self.poll(tx_id, cancel))
				.await
				.map_err(|_| {
					DeployError::Timeout(format!(
						"transaction {} not confirmed within {}s",
						tx_id,
						deadline.as_secs_f64()
					))
				})?,
			None => self.poll(tx_id, cancel).await,
		}
	}

	async fn poll(
		&self,
		tx_id: &TransactionId,
		cancel: &CancellationToken,
	) -> Result<PendingTransactionInfo> {
		let mut round = cancellable(cancel, self.client.current_round()).await?;
		let mut iterations: u64 = 0;

		loop {
			let info = cancellable(cancel, self.client.pending_transaction_info(tx_id)).await?;
			if info.is_confirmed() {
				info!(
					tx_id = %tx_id,
					"Transaction confirmed in round {}",
					info.confirmed_round
				);
				return Ok(info);
			}

			if !info.pool_error.is_empty() {
				warn!(tx_id = %tx_id, pool_error = %info.pool_error, "Transaction pool reported an error");
			}

			round = round.next();
			debug!(tx_id = %tx_id, "Not confirmed yet, waiting for round {}", round);
			cancellable(cancel, self.client.wait_for_round(round)).await?;
			iterations += 1;

			if let Some(max_rounds) = self.options.max_rounds {
				if iterations >= max_rounds {
					return Err(DeployError::Timeout(format!(
						"transaction {} not confirmed after {} rounds",
						tx_id, max_rounds
					)));
				}
			}
		}
	}
}

/// Races `fut` against cancellation; cancellation wins ties.
async fn cancellable<T>(
	cancel: &CancellationToken,
	fut: impl Future<Output = Result<T>>,
) -> Result<T> {
	tokio::select! {
		biased;
		_ = cancel.cancelled() => Err(DeployError::Cancelled),
		result = fut => result,
	}
}
