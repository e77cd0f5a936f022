//! Account handling for the deployer: key material, addresses and
//! transaction signing.

use async_trait::async_trait;
use deployer_types::{Address, ApplicationCreateTransaction, Result, SignedTransaction};

pub mod encoding;
pub mod mnemonic;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::LocalAccount;

/// An account able to sign transactions.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AccountInterface: Send + Sync {
	fn address(&self) -> Address;

	/// Signs `tx`, filling in the fee first when it is zero.
	async fn sign_transaction(&self, tx: &ApplicationCreateTransaction)
		-> Result<SignedTransaction>;
}

pub struct AccountService {
	provider: Box<dyn AccountInterface>,
}

impl AccountService {
	pub fn new(provider: Box<dyn AccountInterface>) -> Self {
		Self { provider }
	}

	pub fn address(&self) -> Address {
		self.provider.address()
	}

	pub async fn sign(&self, tx: &ApplicationCreateTransaction) -> Result<SignedTransaction> {
		self.provider.sign_transaction(tx).await
	}
}
