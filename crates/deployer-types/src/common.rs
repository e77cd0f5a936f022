//! Common types used throughout the deployer.

use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512_256};
use std::fmt;

/// Number of microalgos in one algo.
pub const MICROALGOS_PER_ALGO: u64 = 1_000_000;

/// Length in bytes of the checksum appended to an encoded address.
const ADDRESS_CHECKSUM_LEN: usize = 4;

/// A ledger round, roughly a block height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Round(pub u64);

impl Round {
	/// The round immediately after this one, saturating at `u64::MAX`.
	pub fn next(self) -> Self {
		Round(self.0.saturating_add(1))
	}
}

impl fmt::Display for Round {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Identifier of a submitted transaction, as issued by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
	/// Wraps a ledger-issued identifier. Returns `None` for an empty string.
	pub fn new(id: impl Into<String>) -> Option<Self> {
		let id = id.into();
		if id.is_empty() {
			None
		} else {
			Some(Self(id))
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Amount of microalgos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct MicroAlgos(pub u64);

impl fmt::Display for MicroAlgos {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let whole = self.0 / MICROALGOS_PER_ALGO;
		let frac = self.0 % MICROALGOS_PER_ALGO;
		if frac == 0 {
			return write!(f, "{} ALGO", whole);
		}
		let frac = format!("{:06}", frac);
		write!(f, "{}.{} ALGO", whole, frac.trim_end_matches('0'))
	}
}

/// Account address: an ed25519 public key.
///
/// The textual form is the unpadded base32 encoding of the key followed by
/// the last four bytes of its SHA-512/256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
	pub fn as_bytes(&self) -> &[u8; 32] {
		&self.0
	}

	fn checksum(&self) -> [u8; ADDRESS_CHECKSUM_LEN] {
		let digest = Sha512_256::digest(self.0);
		let mut checksum = [0u8; ADDRESS_CHECKSUM_LEN];
		checksum.copy_from_slice(&digest[digest.len() - ADDRESS_CHECKSUM_LEN..]);
		checksum
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut raw = Vec::with_capacity(32 + ADDRESS_CHECKSUM_LEN);
		raw.extend_from_slice(&self.0);
		raw.extend_from_slice(&self.checksum());
		f.write_str(&BASE32_NOPAD.encode(&raw))
	}
}

impl fmt::Debug for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Address({})", self)
	}
}
