//! Local key implementation of [`AccountInterface`].
//!
//! The key is derived from a 25-word mnemonic and kept in memory for the
//! lifetime of the process.

use crate::{encoding, mnemonic, AccountInterface};
use async_trait::async_trait;
use deployer_types::{Address, ApplicationCreateTransaction, Result, SignedTransaction};
use ed25519_dalek::{Signer, SigningKey};
use tracing::debug;

/// Local wallet backed by an ed25519 signing key.
pub struct LocalAccount {
	signing_key: SigningKey,
	address: Address,
}

impl LocalAccount {
	/// Creates an account from its 25-word mnemonic.
	pub fn from_mnemonic(phrase: &str) -> Result<Self> {
		let seed = mnemonic::seed_from_mnemonic(phrase)?;
		Ok(Self::from_seed(&seed))
	}

	pub fn from_seed(seed: &[u8; 32]) -> Self {
		let signing_key = SigningKey::from_bytes(seed);
		let address = Address(signing_key.verifying_key().to_bytes());
		Self {
			signing_key,
			address,
		}
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn address(&self) -> Address {
		self.address
	}

	async fn sign_transaction(
		&self,
		tx: &ApplicationCreateTransaction,
	) -> Result<SignedTransaction> {
		let mut tx = tx.clone();
		if tx.fee == 0 {
			tx.fee = encoding::estimate_fee(&tx)?;
		}

		let message = encoding::bytes_to_sign(&tx)?;
		let signature = self.signing_key.sign(&message);
		let bytes = encoding::encode_signed_transaction(&tx, &signature.to_bytes())?;
		let id = encoding::transaction_id(&message);

		debug!(tx_id = %id, fee = tx.fee, size = bytes.len(), "Signed transaction");

		Ok(SignedTransaction { id, bytes })
	}
}
