//! Application-creation transaction types.

use crate::{common::Address, ledger::SuggestedParams};
use serde::{Deserialize, Serialize};

/// Storage allocated to an application, in key/value slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSchema {
	pub num_uints: u64,
	pub num_byte_slices: u64,
}

impl StateSchema {
	pub fn new(num_uints: u64, num_byte_slices: u64) -> Self {
		Self {
			num_uints,
			num_byte_slices,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.num_uints == 0 && self.num_byte_slices == 0
	}
}

/// Unsigned application-create transaction with a NoOp on-completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCreateTransaction {
	pub sender: Address,
	pub params: SuggestedParams,
	/// Flat fee in microalgos. Filled in by the signer when zero.
	pub fee: u64,
	pub approval_program: Vec<u8>,
	pub clear_program: Vec<u8>,
	pub global_schema: StateSchema,
	pub local_schema: StateSchema,
}

impl ApplicationCreateTransaction {
	pub fn new(
		sender: Address,
		params: SuggestedParams,
		approval_program: Vec<u8>,
		clear_program: Vec<u8>,
		global_schema: StateSchema,
		local_schema: StateSchema,
	) -> Self {
		Self {
			sender,
			params,
			fee: 0,
			approval_program,
			clear_program,
			global_schema,
			local_schema,
		}
	}
}

/// Encoded, signed transaction ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
	/// Transaction id computed locally from the encoded body.
	pub id: String,
	pub bytes: Vec<u8>,
}
