//! Canonical msgpack encoding of application-create transactions.
//!
//! Canonical form: map keys in lexicographic order, zero and empty values
//! omitted, byte strings encoded as msgpack `bin`. Struct fields below are
//! declared in key order so `rmp_serde::to_vec_named` emits them sorted.

use data_encoding::BASE32_NOPAD;
use deployer_types::{ApplicationCreateTransaction, DeployError, Result, StateSchema};
use serde::Serialize;
use sha2::{Digest, Sha512_256};

/// Domain-separation prefix prepended to a transaction before signing/hashing.
pub const TX_TAG: &[u8] = b"TX";

const APPLICATION_CALL_TYPE: &str = "appl";

const SIGNATURE_LEN: usize = 64;

fn is_zero(v: &u64) -> bool {
	*v == 0
}

#[derive(Serialize)]
struct WireSchema {
	#[serde(skip_serializing_if = "is_zero")]
	nbs: u64,
	#[serde(skip_serializing_if = "is_zero")]
	nui: u64,
}

impl WireSchema {
	fn from_schema(schema: &StateSchema) -> Option<Self> {
		if schema.is_empty() {
			return None;
		}
		Some(Self {
			nbs: schema.num_byte_slices,
			nui: schema.num_uints,
		})
	}
}

#[derive(Serialize)]
struct WireApplicationCreate<'a> {
	#[serde(with = "serde_bytes")]
	apap: &'a [u8],
	#[serde(skip_serializing_if = "Option::is_none")]
	apgs: Option<WireSchema>,
	#[serde(skip_serializing_if = "Option::is_none")]
	apls: Option<WireSchema>,
	#[serde(with = "serde_bytes")]
	apsu: &'a [u8],
	#[serde(skip_serializing_if = "is_zero")]
	fee: u64,
	#[serde(skip_serializing_if = "is_zero")]
	fv: u64,
	#[serde(skip_serializing_if = "str::is_empty")]
	gen: &'a str,
	#[serde(with = "serde_bytes")]
	gh: &'a [u8],
	#[serde(skip_serializing_if = "is_zero")]
	lv: u64,
	#[serde(with = "serde_bytes")]
	snd: &'a [u8],
	#[serde(rename = "type")]
	kind: &'static str,
}

impl<'a> WireApplicationCreate<'a> {
	fn new(tx: &'a ApplicationCreateTransaction) -> Self {
		Self {
			apap: &tx.approval_program,
			apgs: WireSchema::from_schema(&tx.global_schema),
			apls: WireSchema::from_schema(&tx.local_schema),
			apsu: &tx.clear_program,
			fee: tx.fee,
			fv: tx.params.first_valid.0,
			gen: &tx.params.genesis_id,
			gh: &tx.params.genesis_hash,
			lv: tx.params.last_valid.0,
			snd: tx.sender.as_bytes(),
			kind: APPLICATION_CALL_TYPE,
		}
	}
}

#[derive(Serialize)]
struct WireSignedTransaction<'a> {
	#[serde(with = "serde_bytes")]
	sig: &'a [u8],
	txn: WireApplicationCreate<'a>,
}

/// Canonical encoding of the unsigned transaction body.
pub fn encode_transaction(tx: &ApplicationCreateTransaction) -> Result<Vec<u8>> {
	rmp_serde::to_vec_named(&WireApplicationCreate::new(tx))
		.map_err(|e| DeployError::Encoding(format!("Failed to encode transaction: {}", e)))
}

/// Canonical encoding of the signed envelope `{sig, txn}`.
pub fn encode_signed_transaction(
	tx: &ApplicationCreateTransaction,
	signature: &[u8],
) -> Result<Vec<u8>> {
	let envelope = WireSignedTransaction {
		sig: signature,
		txn: WireApplicationCreate::new(tx),
	};
	rmp_serde::to_vec_named(&envelope)
		.map_err(|e| DeployError::Encoding(format!("Failed to encode signed transaction: {}", e)))
}

/// Bytes covered by the signature: `"TX" || body`.
pub fn bytes_to_sign(tx: &ApplicationCreateTransaction) -> Result<Vec<u8>> {
	let body = encode_transaction(tx)?;
	let mut out = Vec::with_capacity(TX_TAG.len() + body.len());
	out.extend_from_slice(TX_TAG);
	out.extend_from_slice(&body);
	Ok(out)
}

/// Transaction id: unpadded base32 of SHA-512/256 over the signed bytes.
pub fn transaction_id(signed_bytes: &[u8]) -> String {
	BASE32_NOPAD.encode(&Sha512_256::digest(signed_bytes))
}

/// Fee for `tx`: per-byte fee times the signed size, never below the minimum.
///
/// The size is measured with the candidate fee written into the body, and
/// the fee is raised until it covers the transaction that carries it.
pub fn estimate_fee(tx: &ApplicationCreateTransaction) -> Result<u64> {
	let mut priced = tx.clone();
	priced.fee = tx.params.min_fee;
	loop {
		let size = encode_signed_transaction(&priced, &[0u8; SIGNATURE_LEN])?.len() as u64;
		let required = tx.params.fee.saturating_mul(size).max(tx.params.min_fee);
		if required <= priced.fee {
			return Ok(priced.fee);
		}
		priced.fee = required;
	}
}
