//! Orchestration of a single application deployment.
//!
//! [`Deployer`] wires the account, ledger client, delivery and storage
//! services together and runs the deployment steps in order: balance check,
//! program compilation, transaction construction, signing, submission,
//! confirmation and persistence of the new application id.

use deployer_account::{AccountService, LocalAccount};
use deployer_delivery::{DeliveryService, WaitOptions};
use deployer_storage::AppIdStore;
use deployer_types::{
	AccountInfo, Address, ApplicationCreateTransaction, CompiledProgram, DeployError,
	DeployerConfig, DeploymentConfig, LedgerClient, Result, TransactionId,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentReceipt {
	pub app_id: u64,
	pub tx_id: TransactionId,
	pub confirmed_round: u64,
	#[serde(serialize_with = "serialize_address")]
	pub creator: Address,
}

fn serialize_address<S: serde::Serializer>(
	address: &Address,
	serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
	serializer.collect_str(address)
}

pub struct Deployer {
	client: Arc<dyn LedgerClient>,
	account: AccountService,
	delivery: DeliveryService,
	store: AppIdStore,
	deployment: DeploymentConfig,
}

impl Deployer {
	pub fn new(
		client: Arc<dyn LedgerClient>,
		account: AccountService,
		deployment: DeploymentConfig,
		options: WaitOptions,
	) -> Self {
		let delivery = DeliveryService::new(client.clone(), options);
		let store = AppIdStore::new(deployment.output_file.clone());
		Self {
			client,
			account,
			delivery,
			store,
			deployment,
		}
	}

	/// Builds a deployer talking to the configured node with the configured key.
	pub async fn from_config(config: &DeployerConfig) -> Result<Self> {
		let client = deployer_chains::create_client(&config.node).await?;
		let account = LocalAccount::from_mnemonic(&config.account.mnemonic)?;

		Ok(Self::new(
			Arc::new(client),
			AccountService::new(Box::new(account)),
			config.deployment.clone(),
			WaitOptions::from(&config.confirmation),
		))
	}

	pub fn address(&self) -> Address {
		self.account.address()
	}

	pub fn store(&self) -> &AppIdStore {
		&self.store
	}

	/// Fetches the deployer's balance and checks it against the configured minimum.
	pub async fn check_balance(&self) -> Result<AccountInfo> {
		let info = self.client.account_info(&self.account.address()).await?;
		info!(balance = %info.amount, "Account balance");

		if info.amount < self.deployment.min_balance {
			return Err(DeployError::InsufficientBalance {
				needed: self.deployment.min_balance,
				available: info.amount,
			});
		}
		Ok(info)
	}

	/// Runs the full deployment.
	///
	/// Cancelling `cancel` before submission aborts without touching the
	/// ledger; cancelling afterwards stops the confirmation wait, but the
	/// transaction may still be confirmed.
	#[instrument(skip_all, fields(creator = %self.account.address()))]
	pub async fn deploy(&self, cancel: &CancellationToken) -> Result<DeploymentReceipt> {
		let creator = self.account.address();
		info!("Deploying from {}", creator);

		self.check_balance().await?;

		let approval = self.compile(&self.deployment.approval_program).await?;
		let clear = self.compile(&self.deployment.clear_program).await?;

		let params = self.client.suggested_params().await?;
		let tx = ApplicationCreateTransaction::new(
			creator,
			params,
			approval.bytes,
			clear.bytes,
			self.deployment.global_schema,
			self.deployment.local_schema,
		);

		let signed = self.account.sign(&tx).await?;

		if cancel.is_cancelled() {
			return Err(DeployError::Cancelled);
		}
		let tx_id = self.delivery.submit(&signed).await?;
		info!("Transaction sent: {}", tx_id);

		let confirmed = self.delivery.wait_for_confirmation(&tx_id, cancel).await?;
		let app_id = confirmed.application_index.ok_or_else(|| {
			DeployError::Network("confirmed transaction has no application index".to_string())
		})?;
		info!(
			app_id,
			round = confirmed.confirmed_round,
			"Application created"
		);

		self.store.save(app_id).await?;

		Ok(DeploymentReceipt {
			app_id,
			tx_id,
			confirmed_round: confirmed.confirmed_round,
			creator,
		})
	}

	async fn compile(&self, path: &Path) -> Result<CompiledProgram> {
		let source = tokio::fs::read_to_string(path).await?;
		let program = self.client.compile(&source).await?;
		info!(
			"Compiled {} ({} bytes, hash {})",
			path.display(),
			program.bytes.len(),
			program.hash
		);
		Ok(program)
	}
}
